use chip8vm::{Chip8Interpreter, Config, Cycle, Fault, MemoryMap, VmError};
use proptest::prelude::*;

fn machine(words: &[u16]) -> Chip8Interpreter {
    let mut m = Chip8Interpreter::new(Config::headless(42));
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
    m.load_program(&bytes).unwrap();
    m
}

fn run(m: &mut Chip8Interpreter, n: usize) -> Result<(), Fault> {
    for _ in 0..n {
        m.cycle()?;
    }
    Ok(())
}

/// V0 = a, V1 = b, then 801N; returns (V0, VF)
fn alu(n: u16, a: u8, b: u8) -> (u8, u8) {
    let mut m = machine(&[0x6000 | a as u16, 0x6100 | b as u16, 0x8010 | n]);
    run(&mut m, 3).unwrap();
    (m.registers().v[0], m.registers().v[0xf])
}

#[test]
fn add_with_carry_all_pairs() {
    for a in 0..=255u8 {
        for b in 0..=255u8 {
            let (result, flag) = alu(0x4, a, b);
            assert_eq!(result, a.wrapping_add(b));
            assert_eq!(flag, (a as u16 + b as u16 > 255) as u8, "{} + {}", a, b);
        }
    }
}

#[test]
fn subtract_with_borrow_all_pairs() {
    for a in 0..=255u8 {
        for b in 0..=255u8 {
            let (result, flag) = alu(0x5, a, b);
            assert_eq!(result, a.wrapping_sub(b));
            assert_eq!(flag, (a >= b) as u8, "{} - {}", a, b);

            let (result, flag) = alu(0x7, a, b);
            assert_eq!(result, b.wrapping_sub(a));
            assert_eq!(flag, (b >= a) as u8, "{} =- {}", a, b);
        }
    }
}

#[test]
fn shifts_flag_pre_shift_bit() {
    for a in 0..=255u8 {
        let (result, flag) = alu(0x6, a, 0);
        assert_eq!(result, a >> 1);
        assert_eq!(flag, a & 1);

        let (result, flag) = alu(0xe, a, 0);
        assert_eq!(result, a << 1);
        assert_eq!(flag, a >> 7);
    }
}

#[test]
fn bcd_store() {
    for (value, digits) in [(157u8, [1u8, 5, 7]), (0, [0, 0, 0]), (255, [2, 5, 5])] {
        let mut m = machine(&[0xa400, 0x6300 | value as u16, 0xf333]);
        run(&mut m, 3).unwrap();
        assert_eq!(m.memory().get_ro_slice(0x400, 3).unwrap(), &digits);
    }
}

#[test]
fn register_dump_load_round_trip() {
    for x in 0..16u16 {
        let mut prog = vec![0xa600];
        // Vn = n * 16 + 1
        prog.extend((0..16).map(|n| 0x6000 | n << 8 | (n * 16 + 1)));
        prog.push(0xf055 | x << 8);
        prog.extend((0..16).map(|n| 0x6000 | n << 8));
        prog.push(0xf065 | x << 8);
        let mut m = machine(&prog);
        run(&mut m, prog.len()).unwrap();
        let v = m.registers().v;
        for n in 0..16usize {
            let expected = if n <= x as usize { n as u8 * 16 + 1 } else { 0 };
            assert_eq!(v[n], expected, "V{:X} after dump/load of V0..=V{:X}", n, x);
        }
    }
}

#[test]
fn sixteen_nested_calls_then_overflow() {
    // every call lands on the next word, which is another call
    let prog: Vec<u16> = (0..17).map(|n| 0x2202 + 2 * n).collect();
    let mut m = machine(&prog);
    run(&mut m, 16).unwrap();
    assert_eq!(m.stack().depth(), 16);
    let fault = m.cycle().unwrap_err();
    assert_eq!(fault.error, VmError::StackOverflow);
    assert_eq!(fault.pc, 0x220);
}

#[test]
fn return_with_empty_stack() {
    let mut m = machine(&[0x00ee]);
    assert_eq!(m.cycle().unwrap_err().error, VmError::StackUnderflow);
}

#[test]
fn timers_only_move_on_ticks() {
    // delay = sound = 0x80, then spin for ever
    let mut m = machine(&[0x6080, 0xf015, 0xf018, 0x1206]);
    run(&mut m, 1000).unwrap();
    assert_eq!(m.timers().delay, 0x80);
    assert_eq!(m.timers().sound, 0x80);
    m.tick_timers();
    assert_eq!(m.timers().delay, 0x7f);
    assert_eq!(m.timers().sound, 0x7f);
}

#[test]
fn wait_for_key_suspends() {
    let mut m = machine(&[0xfa0a, 0x6b01]);
    run(&mut m, 1).unwrap();
    for _ in 0..100 {
        assert_eq!(m.cycle(), Ok(Cycle::Waiting));
        assert_eq!(m.registers().pc, 0x200);
        assert_eq!(m.registers().v[0xa], 0);
    }
    m.set_key(0xe, true).unwrap();
    assert_eq!(m.cycle(), Ok(Cycle::Resumed { key: 0xe }));
    assert_eq!(m.registers().v[0xa], 0xe);
    run(&mut m, 1).unwrap();
    assert_eq!(m.registers().v[0xb], 1);
    assert_eq!(m.registers().pc, 0x204);
}

proptest! {
    #[test]
    fn drawing_twice_restores_screen(
        sprite in proptest::collection::vec(any::<u8>(), 1..16),
        x in any::<u8>(),
        y in any::<u8>(),
    ) {
        // sprite data at 0x300; V0 = x, V1 = y, draw, draw again
        let n = sprite.len() as u16;
        let mut m = Chip8Interpreter::new(Config::headless(7));
        let mut rom = vec![0u8; 0x100 + sprite.len()];
        let words = [0xa300, 0x6000 | x as u16, 0x6100 | y as u16, 0xd010 | n, 0xd010 | n];
        for (i, w) in words.iter().enumerate() {
            rom[2 * i..2 * i + 2].copy_from_slice(&w.to_be_bytes());
        }
        rom[0x100..].copy_from_slice(&sprite);
        m.load_program(&rom).unwrap();

        run(&mut m, 4).unwrap();
        let lit = m.framebuffer().lit();
        prop_assert_eq!(lit, sprite.iter().map(|b| b.count_ones()).sum::<u32>());
        prop_assert_eq!(m.registers().v[0xf], 0);

        run(&mut m, 1).unwrap();
        prop_assert_eq!(m.framebuffer().lit(), 0);
        let collided = lit > 0;
        prop_assert_eq!(m.registers().v[0xf], collided as u8);
    }

    #[test]
    fn add_immediate_never_touches_flag(a in any::<u8>(), kk in any::<u8>(), f in any::<u8>()) {
        let mut m = machine(&[0x6f00 | f as u16, 0x6300 | a as u16, 0x7300 | kk as u16]);
        run(&mut m, 3).unwrap();
        prop_assert_eq!(m.registers().v[3], a.wrapping_add(kk));
        prop_assert_eq!(m.registers().v[0xf], f);
    }
}
