use rand::prelude::*;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::display::{Framebuffer, Renderer};
use crate::error::{Error, Result};
use crate::instruction::{kk, n, nnn, x, y, Instruction};
use crate::keypad::{HostInput, Keypad};
use crate::memory::{Memory, GLYPH_SIZE, PROGRAM_START};
use crate::timer::DelayTimer;

const STACK_SIZE: usize = 16;

/// What a handler wants done with the program counter once it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProgramCounter {
    /// on to the following instruction
    Next,
    /// skip over the following instruction
    Skip,
    /// the handler picked the address itself
    Jump(u16),
}

/// Why the run loop stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
}

/// The CHIP-8 VM: registers and stack, plus the memory, screen, delay timer
/// and keypad it drives.
pub struct Cpu {
    v: [u8; 16], // registers V0-VE (VF is flag for some instructions)
    i: u16,      // address register
    pc: u16,     // program counter
    stack: [u16; STACK_SIZE],
    sp: usize, // grows down from STACK_SIZE, which means empty

    memory: Memory,
    framebuffer: Arc<Framebuffer>,
    delay_timer: DelayTimer,
    keypad: Keypad,

    // emulator resources
    rng: ThreadRng,
    config: Config,
    quit: bool,
}

impl Cpu {
    pub fn new(input: Box<dyn HostInput>, config: Config) -> Self {
        Self {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            stack: [0; STACK_SIZE],
            sp: STACK_SIZE,

            memory: Memory::new(),
            framebuffer: Arc::new(Framebuffer::new()),
            delay_timer: DelayTimer::new(config.timer_hz),
            keypad: Keypad::new(input),

            rng: rand::thread_rng(),
            config,
            quit: false,
        }
    }

    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        self.memory.load_program(program)?;
        log::info!("loaded {} byte program at {:#05X}", program.len(), PROGRAM_START);
        Ok(())
    }

    pub fn load_program_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let program = std::fs::read(path)?;
        self.load_program(&program)
    }

    /// register Vx; only the low nibble of `register` is used
    pub fn v(&self, register: u8) -> u8 {
        self.v[usize::from(register & 0xF)]
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// shared handle to the screen, for renderers living elsewhere
    pub fn framebuffer(&self) -> Arc<Framebuffer> {
        Arc::clone(&self.framebuffer)
    }

    pub fn delay_timer(&self) -> &DelayTimer {
        &self.delay_timer
    }

    pub fn push(&mut self, address: u16) -> Result<()> {
        if self.sp == 0 {
            return Err(Error::StackOverflow);
        }
        self.sp -= 1;
        self.stack[self.sp] = address;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.sp >= STACK_SIZE {
            return Err(Error::StackUnderflow);
        }
        let address = self.stack[self.sp];
        self.sp += 1;
        Ok(address)
    }

    /// Run until the host asks to quit or something goes wrong. Each iteration
    /// executes one instruction, renders the screen, then polls input.
    pub fn run(&mut self, renderer: &mut dyn Renderer) -> Result<Exit> {
        // a quit seen by an earlier run doesn't carry over
        self.quit = false;
        loop {
            if let Err(err) = self.step() {
                log::error!("stopping at {:#05X}: {}\n{}", self.pc, err, self.dump());
                return Err(err);
            }

            renderer.render(&self.framebuffer)?;

            // poll first so key state is current even when quitting from a key wait
            let quit_requested = self.keypad.poll();
            if self.quit || quit_requested {
                log::info!("quit requested");
                return Ok(Exit::Quit);
            }

            std::thread::sleep(self.config.cycle_delay);
        }
    }

    /// One fetch, decode, execute, advance.
    pub fn step(&mut self) -> Result<()> {
        let opcode = self.fetch()?;
        let instruction = Instruction::decode(opcode);
        log::trace!("{:03X}: {:04X} {}", self.pc, opcode, instruction.name());

        match self.execute(instruction, opcode)? {
            ProgramCounter::Next => self.pc = self.pc.wrapping_add(2),
            ProgramCounter::Skip => self.pc = self.pc.wrapping_add(4),
            ProgramCounter::Jump(address) => self.pc = address,
        }
        Ok(())
    }

    /// two-byte opcodes, big endian
    pub fn fetch(&self) -> Result<u16> {
        let hi = self.memory.read(self.pc)?;
        let lo = self.memory.read(self.pc.wrapping_add(1))?;
        Ok(u16::from(hi) << 8 | u16::from(lo))
    }

    fn execute(&mut self, instruction: Instruction, opcode: u16) -> Result<ProgramCounter> {
        use Instruction::*;
        match instruction {
            Clear => self.cls(opcode),
            Return => self.ret(opcode),
            Jump => self.jmp(opcode),
            Call => self.call(opcode),
            SkipEqualByte => self.se_byte(opcode),
            SkipNotEqualByte => self.sne_byte(opcode),
            SkipEqualReg => self.se_reg(opcode),
            LoadByte => self.ld_byte(opcode),
            AddByte => self.add_byte(opcode),
            LoadReg => self.ld_reg(opcode),
            Or => self.or(opcode),
            And => self.and(opcode),
            Xor => self.xor(opcode),
            AddReg => self.add_reg(opcode),
            SubReg => self.sub_reg(opcode),
            ShiftRight => self.shr(opcode),
            SubN => self.subn(opcode),
            ShiftLeft => self.shl(opcode),
            SkipNotEqualReg => self.sne_reg(opcode),
            LoadI => self.ld_i(opcode),
            JumpOffset => self.jmp_offset(opcode),
            Random => self.rnd(opcode),
            Draw => self.drw(opcode),
            SkipKey => self.skp(opcode),
            SkipNotKey => self.sknp(opcode),
            LoadDelay => self.ld_from_dt(opcode),
            WaitKey => self.wait_key(opcode),
            SetDelay => self.ld_dt(opcode),
            AddI => self.add_i(opcode),
            LoadGlyph => self.ld_glyph(opcode),
            StoreBcd => self.bcd(opcode),
            StoreRegs => self.store_regs(opcode),
            LoadRegs => self.load_regs(opcode),
            Unknown => {
                log::debug!("ignoring unknown opcode {:04X} at {:#05X}", opcode, self.pc);
                Ok(ProgramCounter::Next)
            }
        }
    }

    /// catches a handler being fed an opcode from some other instruction
    fn expect(instruction: Instruction, opcode: u16) -> Result<()> {
        if instruction.matches(opcode) {
            Ok(())
        } else {
            Err(Error::InvalidInstruction {
                opcode,
                expected: instruction.name(),
            })
        }
    }

    fn skip_if(condition: bool) -> ProgramCounter {
        if condition {
            ProgramCounter::Skip
        } else {
            ProgramCounter::Next
        }
    }

    fn cls(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 00E0
        // clear screen
        Self::expect(Instruction::Clear, opcode)?;
        self.framebuffer.clear();
        Ok(ProgramCounter::Next)
    }

    fn ret(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 00EE
        // return from subroutine; call pushed the address after itself
        Self::expect(Instruction::Return, opcode)?;
        let address = self.pop()?;
        Ok(ProgramCounter::Jump(address))
    }

    fn jmp(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 1NNN
        // jump to NNN
        Self::expect(Instruction::Jump, opcode)?;
        Ok(ProgramCounter::Jump(nnn(opcode)))
    }

    fn call(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 2NNN
        // call subroutine at NNN
        Self::expect(Instruction::Call, opcode)?;
        self.push(self.pc.wrapping_add(2))?;
        Ok(ProgramCounter::Jump(nnn(opcode)))
    }

    fn se_byte(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 3XNN
        // skip if VX == NN
        Self::expect(Instruction::SkipEqualByte, opcode)?;
        Ok(Self::skip_if(self.v[x(opcode)] == kk(opcode)))
    }

    fn sne_byte(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 4XNN
        // skip if VX != NN
        Self::expect(Instruction::SkipNotEqualByte, opcode)?;
        Ok(Self::skip_if(self.v[x(opcode)] != kk(opcode)))
    }

    fn se_reg(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 5XY0
        // skip if VX == VY
        Self::expect(Instruction::SkipEqualReg, opcode)?;
        Ok(Self::skip_if(self.v[x(opcode)] == self.v[y(opcode)]))
    }

    fn ld_byte(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 6XNN
        // set VX to NN
        Self::expect(Instruction::LoadByte, opcode)?;
        self.v[x(opcode)] = kk(opcode);
        Ok(ProgramCounter::Next)
    }

    fn add_byte(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 7XNN
        // add NN to VX (no carry)
        Self::expect(Instruction::AddByte, opcode)?;
        let x = x(opcode);
        self.v[x] = self.v[x].wrapping_add(kk(opcode));
        Ok(ProgramCounter::Next)
    }

    fn ld_reg(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 8XY0
        // set VX to VY
        Self::expect(Instruction::LoadReg, opcode)?;
        self.v[x(opcode)] = self.v[y(opcode)];
        Ok(ProgramCounter::Next)
    }

    fn or(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 8XY1
        Self::expect(Instruction::Or, opcode)?;
        self.v[x(opcode)] |= self.v[y(opcode)];
        Ok(ProgramCounter::Next)
    }

    fn and(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 8XY2
        Self::expect(Instruction::And, opcode)?;
        self.v[x(opcode)] &= self.v[y(opcode)];
        Ok(ProgramCounter::Next)
    }

    fn xor(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 8XY3
        Self::expect(Instruction::Xor, opcode)?;
        self.v[x(opcode)] ^= self.v[y(opcode)];
        Ok(ProgramCounter::Next)
    }

    fn add_reg(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 8XY4
        // add VY to VX (set VF = 1 if there's a carry)
        Self::expect(Instruction::AddReg, opcode)?;
        let (x, y) = (x(opcode), y(opcode));
        let (sum, carry) = self.v[x].overflowing_add(self.v[y]);
        self.v[x] = sum;
        self.v[0xF] = carry as u8;
        Ok(ProgramCounter::Next)
    }

    fn sub_reg(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 8XY5
        // sub VY from VX (set VF = 1 if VX > VY)
        Self::expect(Instruction::SubReg, opcode)?;
        let (vx, vy) = (self.v[x(opcode)], self.v[y(opcode)]);
        self.v[0xF] = (vx > vy) as u8;
        self.v[x(opcode)] = vx.wrapping_sub(vy);
        Ok(ProgramCounter::Next)
    }

    fn shr(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 8XY6
        // store the LSB of VX in VF and shift VX one to the right
        Self::expect(Instruction::ShiftRight, opcode)?;
        let vx = self.v[x(opcode)];
        self.v[0xF] = vx & 0x1;
        self.v[x(opcode)] = vx >> 1;
        Ok(ProgramCounter::Next)
    }

    fn subn(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 8XY7
        // set VX to VY - VX (set VF = 1 if VY > VX)
        Self::expect(Instruction::SubN, opcode)?;
        let (vx, vy) = (self.v[x(opcode)], self.v[y(opcode)]);
        self.v[0xF] = (vy > vx) as u8;
        self.v[x(opcode)] = vy.wrapping_sub(vx);
        Ok(ProgramCounter::Next)
    }

    fn shl(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 8XYE
        // store the MSB of VX in VF and shift VX one to the left
        Self::expect(Instruction::ShiftLeft, opcode)?;
        let vx = self.v[x(opcode)];
        self.v[0xF] = vx >> 7;
        self.v[x(opcode)] = vx << 1;
        Ok(ProgramCounter::Next)
    }

    fn sne_reg(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // 9XY0
        // skip if VX != VY
        Self::expect(Instruction::SkipNotEqualReg, opcode)?;
        Ok(Self::skip_if(self.v[x(opcode)] != self.v[y(opcode)]))
    }

    fn ld_i(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // ANNN
        // set I to NNN
        Self::expect(Instruction::LoadI, opcode)?;
        self.i = nnn(opcode);
        Ok(ProgramCounter::Next)
    }

    fn jmp_offset(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // BNNN
        // jump to NNN + V0; past 0xFFF the next fetch fails
        Self::expect(Instruction::JumpOffset, opcode)?;
        Ok(ProgramCounter::Jump(nnn(opcode) + u16::from(self.v[0])))
    }

    fn rnd(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // CXNN
        // Set VX = RNG[0, 256) & NN
        Self::expect(Instruction::Random, opcode)?;
        self.v[x(opcode)] = self.rng.gen::<u8>() & kk(opcode);
        Ok(ProgramCounter::Next)
    }

    fn drw(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // DXYN
        // draw a sprite at VX,VY with a width of 8 pixels and a height of N pixels
        // each row of 8 pixels is bit-coded in memory starting at I
        // VF is set to 1 if any lit screen pixels are hit by lit sprite pixels
        Self::expect(Instruction::Draw, opcode)?;
        let mut sprite = Vec::with_capacity(n(opcode));
        for row in 0..n(opcode) as u16 {
            sprite.push(self.memory.read(self.i.wrapping_add(row))?);
        }
        let vx = self.v[x(opcode)] as usize;
        let vy = self.v[y(opcode)] as usize;
        let collision = self.framebuffer.draw(vx, vy, &sprite);
        self.v[0xF] = collision as u8;
        Ok(ProgramCounter::Next)
    }

    fn skp(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // EX9E
        // skip if key stored in VX is pressed
        Self::expect(Instruction::SkipKey, opcode)?;
        let pressed = self.keypad.is_pressed(self.v[x(opcode)])?;
        Ok(Self::skip_if(pressed))
    }

    fn sknp(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // EXA1
        // skip if key stored in VX isn't pressed
        Self::expect(Instruction::SkipNotKey, opcode)?;
        let pressed = self.keypad.is_pressed(self.v[x(opcode)])?;
        Ok(Self::skip_if(!pressed))
    }

    fn ld_from_dt(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // FX07
        // set VX to delay timer
        Self::expect(Instruction::LoadDelay, opcode)?;
        self.v[x(opcode)] = self.delay_timer.get();
        Ok(ProgramCounter::Next)
    }

    fn wait_key(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // FX0A
        // store next key press in VX, blocking instruction; the delay timer keeps ticking
        Self::expect(Instruction::WaitKey, opcode)?;
        log::debug!("waiting for a key press");
        match self.keypad.wait_for_key() {
            Some(key) => self.v[x(opcode)] = key,
            None => self.quit = true,
        }
        Ok(ProgramCounter::Next)
    }

    fn ld_dt(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // FX15
        // set delay timer to VX
        Self::expect(Instruction::SetDelay, opcode)?;
        self.delay_timer.set(self.v[x(opcode)]);
        Ok(ProgramCounter::Next)
    }

    fn add_i(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // FX1E
        // add VX to I
        Self::expect(Instruction::AddI, opcode)?;
        self.i = self.i.wrapping_add(u16::from(self.v[x(opcode)]));
        Ok(ProgramCounter::Next)
    }

    fn ld_glyph(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // FX29
        // set I to location in memory of sprite for character in VX
        Self::expect(Instruction::LoadGlyph, opcode)?;
        let index = self.v[x(opcode)];
        if index > 0xF {
            return Err(Error::InvalidGlyphIndex { index });
        }
        self.i = GLYPH_SIZE * u16::from(index); // fontset is in the first 80 bytes
        Ok(ProgramCounter::Next)
    }

    fn bcd(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // FX33
        // store the BCD representation of VX at I
        // so 193 becomes [1, 9, 3] in memory at I
        Self::expect(Instruction::StoreBcd, opcode)?;
        let vx = self.v[x(opcode)];
        self.memory.write(vx / 100, self.i)?;
        self.memory.write((vx / 10) % 10, self.i.wrapping_add(1))?;
        self.memory.write(vx % 10, self.i.wrapping_add(2))?;
        Ok(ProgramCounter::Next)
    }

    fn store_regs(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // FX55
        // store V0 to VX (inclusive) in memory at I
        Self::expect(Instruction::StoreRegs, opcode)?;
        for offset in 0..=x(opcode) {
            self.memory
                .write(self.v[offset], self.i.wrapping_add(offset as u16))?;
        }
        Ok(ProgramCounter::Next)
    }

    fn load_regs(&mut self, opcode: u16) -> Result<ProgramCounter> {
        // FX65
        // fill V0 to VX (inclusive) from memory at I
        Self::expect(Instruction::LoadRegs, opcode)?;
        for offset in 0..=x(opcode) {
            self.v[offset] = self.memory.read(self.i.wrapping_add(offset as u16))?;
        }
        Ok(ProgramCounter::Next)
    }

    /// registers, stack and pointers, for post-mortems
    pub fn dump(&self) -> String {
        let mut out = String::from("V: [ ");
        for v in &self.v {
            let _ = write!(out, "{:02X} ", v);
        }
        out.push_str("]\nstack: [ ");
        for s in &self.stack[self.sp..] {
            let _ = write!(out, "{:03X} ", s);
        }
        let _ = write!(out, "]\nI: {:03X}  PC: {:03X}  SP: {}", self.i, self.pc, self.sp);
        out
    }
}
