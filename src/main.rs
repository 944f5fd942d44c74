// Reference host: owns the window, the keyboard mapping and the pacing.
//
// Separately:
// CPU: --ips times per second (700 by default)
// Display: 60 times per second
// Timer: 60 times per second

use std::{fs, time::Duration};

use anyhow::Context;
use chip8_core::{
    display::{HEIGHT, WIDTH},
    Config, Emulator, Quirks, RomBuffer,
};
use clap::{Parser, ValueEnum};
use minifb::{Key, Scale, Window, WindowOptions};

const FRAMES_PER_SECOND: u32 = 60;

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 interpreter", long_about = None)]
struct Args {
    /// Path to the ROM file to run
    rom: String,

    /// Instructions per second
    #[arg(short, long, default_value_t = 700)]
    ips: u32,

    /// Window scale factor
    #[arg(short, long, value_enum, default_value = "16")]
    scale: WindowScale,

    /// 8XY6/8XYE shift VY into VX
    #[arg(long)]
    shift_uses_vy: bool,

    /// FX1E sets VF when I leaves the 12-bit address space
    #[arg(long)]
    index_add_sets_vf: bool,

    /// FX55/FX65 leave I unchanged
    #[arg(long)]
    no_load_store_increment: bool,

    /// Seed for the CXNN random source
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum WindowScale {
    #[value(name = "1")]
    X1,
    #[value(name = "2")]
    X2,
    #[value(name = "4")]
    X4,
    #[value(name = "8")]
    X8,
    #[value(name = "16")]
    X16,
    #[value(name = "32")]
    X32,
}

impl From<WindowScale> for Scale {
    fn from(scale: WindowScale) -> Self {
        match scale {
            WindowScale::X1 => Scale::X1,
            WindowScale::X2 => Scale::X2,
            WindowScale::X4 => Scale::X4,
            WindowScale::X8 => Scale::X8,
            WindowScale::X16 => Scale::X16,
            WindowScale::X32 => Scale::X32,
        }
    }
}

impl Args {
    fn config(&self) -> Config {
        Config {
            quirks: Quirks {
                shift_uses_vy: self.shift_uses_vy,
                index_add_sets_vf: self.index_add_sets_vf,
                load_store_increments_index: !self.no_load_store_increment,
            },
            rng_seed: self.seed,
            ..Config::default()
        }
    }
}

// 1 2 3 4      1 2 3 C
// Q W E R  ->  4 5 6 D
// A S D F      7 8 9 E
// Z X C V      A 0 B F
fn key_to_num(key: Key) -> Option<u8> {
    match key {
        Key::Key1 => Some(0x1),
        Key::Key2 => Some(0x2),
        Key::Key3 => Some(0x3),
        Key::Key4 => Some(0xC),
        Key::Q => Some(0x4),
        Key::W => Some(0x5),
        Key::E => Some(0x6),
        Key::R => Some(0xD),
        Key::A => Some(0x7),
        Key::S => Some(0x8),
        Key::D => Some(0x9),
        Key::F => Some(0xE),
        Key::Z => Some(0xA),
        Key::X => Some(0x0),
        Key::C => Some(0xB),
        Key::V => Some(0xF),
        _ => None,
    }
}

fn key_mask(window: &Window) -> u16 {
    window
        .get_keys()
        .into_iter()
        .filter_map(key_to_num)
        .fold(0, |mask, key| mask | (1 << key))
}

// minifb wants 0RGB words
fn to_0rgb(rgba: &[u8], out: &mut [u32]) {
    for (px, word) in rgba.chunks_exact(4).zip(out.iter_mut()) {
        *word = u32::from_be_bytes([0, px[0], px[1], px[2]]);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let program = fs::read(&args.rom).with_context(|| format!("reading {}", args.rom))?;
    let mut rom = RomBuffer::alloc(program.len())?;
    rom.as_mut_slice().copy_from_slice(&program);
    let mut emu = Emulator::new(rom.as_slice(), args.config())?;
    log::info!("running {} ({} bytes) at {} ips", args.rom, rom.len(), args.ips);

    let mut window = Window::new(
        "chip8-core - ESC to exit",
        WIDTH,
        HEIGHT,
        WindowOptions {
            scale: args.scale.into(),
            ..WindowOptions::default()
        },
    )?;
    window.limit_update_rate(Some(Duration::from_secs(1) / FRAMES_PER_SECOND));

    let steps_per_frame = (args.ips / FRAMES_PER_SECOND).max(1);
    let mut pixels = vec![0u32; WIDTH * HEIGHT];
    let mut beeping = false;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        emu.set_keys(key_mask(&window));
        // a halted machine just keeps showing its last frame
        if emu.fault().is_none() {
            for _ in 0..steps_per_frame {
                if emu.step().is_err() {
                    break;
                }
            }
        }
        emu.tick();

        if emu.sound_active() != beeping {
            beeping = emu.sound_active();
            window.set_title(if beeping {
                "chip8-core - ESC to exit [beep]"
            } else {
                "chip8-core - ESC to exit"
            });
        }

        to_0rgb(emu.frame(), &mut pixels);
        window.update_with_buffer(&pixels, WIDTH, HEIGHT)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_accepts_only_minifb_factors() {
        let args = Args::try_parse_from(["chip8-core", "game.ch8", "--scale", "8"]).unwrap();
        assert_eq!(args.scale, WindowScale::X8);

        let args = Args::try_parse_from(["chip8-core", "game.ch8"]).unwrap();
        assert_eq!(args.scale, WindowScale::X16);

        for bad in ["3", "0", "64", "big"] {
            assert!(
                Args::try_parse_from(["chip8-core", "game.ch8", "--scale", bad]).is_err(),
                "--scale {bad} should be rejected"
            );
        }
    }

    #[test]
    fn quirk_flags_reach_the_config() {
        let args = Args::try_parse_from([
            "chip8-core",
            "game.ch8",
            "--shift-uses-vy",
            "--no-load-store-increment",
            "--seed",
            "9",
        ])
        .unwrap();
        let config = args.config();
        assert!(config.quirks.shift_uses_vy);
        assert!(!config.quirks.index_add_sets_vf);
        assert!(!config.quirks.load_store_increments_index);
        assert_eq!(config.rng_seed, Some(9));
    }
}
