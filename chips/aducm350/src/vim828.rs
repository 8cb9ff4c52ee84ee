// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Display encoder for the VIM-828 eight-character 14-segment LCD.
//!
//! Each character cell is a 14-segment figure plus a decimal point. A
//! glyph packs the cell's segment state into 16 bits; the two bytes of
//! the glyph land in two different LCD data registers, with the byte
//! lane depending on the cell position. Cell 1 of the panel, for
//! example, splits across registers 7 and 0: the glyph for 'A'
//! (0x2746) is written as 0x2700 into register 7 and 0x0046 into
//! register 0, while cell 2 puts the same glyph into the opposite byte
//! lanes of the same register pair.
//!
//! Decimal points do not occupy a character cell of their own when the
//! text contains at most one of them: the dot attaches to the cell
//! before it and the rest of the text closes the gap. Text with several
//! dots is laid out verbatim, each dot in its own otherwise blank cell.
//!
//! The supported character set is the digits, the uppercase letters,
//! '-', ' ' and '.'. The whole input is validated before any register
//! is touched, so a rejected string never leaves a half-updated panel.

use crate::lcd::{DataRegisterBank, Screen, NUM_DATA_REGISTERS};

/// Character cells on the panel.
pub const NUM_CELLS: usize = 8;

/// Segment image of the decimal point, OR-ed into the cell's glyph.
const DOT_GLYPH: u16 = 0x0800;

/// Packed 14-segment images for '0'..='9'.
const DIGIT_GLYPHS: [u16; 10] = [
    0x178e, 0x0600, 0x234c, 0x2748, 0x2642, 0x1548, 0x254e, 0x0700, 0x274e, 0x274a,
];

/// Packed 14-segment images for 'A'..='Z'.
const LETTER_GLYPHS: [u16; 26] = [
    0x2746, 0x8758, 0x010e, 0x8718, 0x210e, 0x2106, 0x054e, 0x2646, 0x8118, 0x811c, 0x20a6,
    0x000e, 0x1626, 0x1686, 0x070e, 0x2346, 0x078e, 0x23c6, 0x254a, 0x8110, 0x060e, 0x4026,
    0x4686, 0x50a0, 0x9020, 0x4128,
];

fn glyph_for(ch: char) -> Option<u16> {
    match ch {
        '0'..='9' => Some(DIGIT_GLYPHS[ch as usize - '0' as usize]),
        'A'..='Z' => Some(LETTER_GLYPHS[ch as usize - 'A' as usize]),
        '-' => Some(0x0040),
        ' ' => Some(0x0000),
        _ => None,
    }
}

/// Destination byte lane of one half of a glyph.
#[derive(Clone, Copy)]
enum Lane {
    /// Glyph high byte into the register high byte
    HighInPlace,
    /// Glyph high byte into the register low byte
    HighToLow,
    /// Glyph low byte into the register low byte
    LowInPlace,
    /// Glyph low byte into the register high byte
    LowToHigh,
}

impl Lane {
    fn place(self, glyph: u16) -> u16 {
        match self {
            Lane::HighInPlace => glyph & 0xff00,
            Lane::HighToLow => glyph >> 8,
            Lane::LowInPlace => glyph & 0x00ff,
            Lane::LowToHigh => glyph << 8,
        }
    }
}

/// Where the two halves of a cell's glyph land in the data registers.
struct Placement {
    high_reg: usize,
    high_lane: Lane,
    low_reg: usize,
    low_lane: Lane,
}

/// Register routing per cell, left to right across the panel.
const PLACEMENTS: [Placement; NUM_CELLS] = [
    Placement {
        high_reg: 7,
        high_lane: Lane::HighInPlace,
        low_reg: 0,
        low_lane: Lane::LowInPlace,
    },
    Placement {
        high_reg: 7,
        high_lane: Lane::HighToLow,
        low_reg: 0,
        low_lane: Lane::LowToHigh,
    },
    Placement {
        high_reg: 6,
        high_lane: Lane::HighInPlace,
        low_reg: 1,
        low_lane: Lane::LowInPlace,
    },
    Placement {
        high_reg: 6,
        high_lane: Lane::HighToLow,
        low_reg: 1,
        low_lane: Lane::LowToHigh,
    },
    Placement {
        high_reg: 5,
        high_lane: Lane::HighInPlace,
        low_reg: 2,
        low_lane: Lane::LowInPlace,
    },
    Placement {
        high_reg: 5,
        high_lane: Lane::HighToLow,
        low_reg: 2,
        low_lane: Lane::LowToHigh,
    },
    Placement {
        high_reg: 4,
        high_lane: Lane::HighInPlace,
        low_reg: 3,
        low_lane: Lane::LowInPlace,
    },
    Placement {
        high_reg: 4,
        high_lane: Lane::HighToLow,
        low_reg: 3,
        low_lane: Lane::LowToHigh,
    },
];

/// One laid-out character cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    ch: char,
    dot: bool,
}

const BLANK: Cell = Cell {
    ch: ' ',
    dot: false,
};

/// Distribute `text` over the 8 cells, applying the decimal point
/// rules. Rejects unsupported characters without producing a layout.
fn layout(text: &str) -> Result<[Cell; NUM_CELLS], crate::ErrorCode> {
    for ch in text.chars() {
        if ch != '.' && glyph_for(ch).is_none() {
            return Err(crate::ErrorCode::INVAL);
        }
    }

    let dots = text.chars().filter(|&c| c == '.').count();
    let mut cells = [BLANK; NUM_CELLS];
    let mut used = 0;

    for ch in text.chars() {
        if ch == '.' && dots == 1 {
            if used == 0 {
                // A leading dot gets a blank cell of its own.
                cells[0].dot = true;
                used = 1;
            } else {
                // The dot rides on the preceding cell; later characters
                // close the gap. A character pushed off the end leaves
                // the tail cell blank.
                cells[used - 1].dot = true;
            }
        } else if used < NUM_CELLS {
            if ch == '.' {
                // Several dots: each one keeps its own blank cell.
                cells[used].dot = true;
            } else {
                cells[used].ch = ch;
            }
            used += 1;
        }
    }

    Ok(cells)
}

/// Turn laid-out cells into the image of the 8 data registers.
fn render(cells: &[Cell; NUM_CELLS]) -> [u16; NUM_DATA_REGISTERS] {
    let mut image = [0u16; NUM_DATA_REGISTERS];
    for (cell, placement) in cells.iter().zip(PLACEMENTS.iter()) {
        // Layout only ever emits supported characters.
        let mut glyph = glyph_for(cell.ch).unwrap_or(0);
        if cell.dot {
            glyph |= DOT_GLYPH;
        }
        image[placement.high_reg] |= placement.high_lane.place(glyph);
        image[placement.low_reg] |= placement.low_lane.place(glyph);
    }
    image
}

/// Encoder instance bound to a data register bank (the LCD controller,
/// or a fake bank under test).
pub struct Vim828<'a, B: DataRegisterBank> {
    bank: &'a B,
}

impl<'a, B: DataRegisterBank> Vim828<'a, B> {
    pub const fn new(bank: &'a B) -> Vim828<'a, B> {
        Vim828 { bank }
    }

    /// Lay out and show `text` on `screen`. The previous content of the
    /// screen is fully replaced. Nothing is written when the text
    /// contains an unsupported character.
    pub fn display(&self, screen: Screen, text: &str) -> Result<(), crate::ErrorCode> {
        let cells = layout(text)?;
        let image = render(&cells);
        for (index, value) in image.iter().enumerate() {
            self.bank.set_data_register(screen, index, *value);
        }
        Ok(())
    }

    /// Blank the whole panel on `screen`.
    pub fn clear(&self, screen: Screen) {
        for index in 0..NUM_DATA_REGISTERS {
            self.bank.set_data_register(screen, index, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell as CoreCell;

    struct FakeBank {
        regs: [[CoreCell<u16>; NUM_DATA_REGISTERS]; 2],
        writes: CoreCell<usize>,
    }

    impl FakeBank {
        fn new() -> FakeBank {
            FakeBank {
                regs: [
                    [const { CoreCell::new(0) }; NUM_DATA_REGISTERS],
                    [const { CoreCell::new(0) }; NUM_DATA_REGISTERS],
                ],
                writes: CoreCell::new(0),
            }
        }

        fn screen0(&self) -> [u16; NUM_DATA_REGISTERS] {
            let mut out = [0u16; NUM_DATA_REGISTERS];
            for (o, r) in out.iter_mut().zip(self.regs[0].iter()) {
                *o = r.get();
            }
            out
        }
    }

    impl DataRegisterBank for FakeBank {
        fn data_register(&self, screen: Screen, index: usize) -> u16 {
            let page = match screen {
                Screen::Screen0 => 0,
                Screen::Screen1 => 1,
            };
            self.regs[page][index].get()
        }

        fn set_data_register(&self, screen: Screen, index: usize, value: u16) {
            let page = match screen {
                Screen::Screen0 => 0,
                Screen::Screen1 => 1,
            };
            self.regs[page][index].set(value);
            self.writes.set(self.writes.get() + 1);
        }
    }

    fn cells(text: &str) -> [Cell; NUM_CELLS] {
        layout(text).unwrap()
    }

    #[test]
    fn first_cell_splits_across_registers_7_and_0() {
        let image = render(&cells("A       "));
        assert_eq!(image[7], 0x2700);
        assert_eq!(image[0], 0x0046);
        for reg in [1, 2, 3, 4, 5, 6] {
            assert_eq!(image[reg], 0);
        }
    }

    #[test]
    fn second_cell_uses_the_opposite_byte_lanes() {
        let image = render(&cells(" A      "));
        assert_eq!(image[7], 0x0027);
        assert_eq!(image[0], 0x4600);
    }

    #[test]
    fn every_cell_pair_shares_a_register_pair() {
        // "AAAAAAAA" puts the glyph into both lanes of all four pairs.
        let image = render(&cells("AAAAAAAA"));
        for reg in [7, 6, 5, 4] {
            assert_eq!(image[reg], 0x2727);
        }
        for reg in [0, 1, 2, 3] {
            assert_eq!(image[reg], 0x4646);
        }
    }

    #[test]
    fn leading_dot_blanks_the_first_cell() {
        let laid = cells(".1234567");
        assert_eq!(laid[0], Cell { ch: ' ', dot: true });
        assert_eq!(laid[1], Cell { ch: '1', dot: false });
        assert_eq!(laid[7], Cell { ch: '7', dot: false });
    }

    #[test]
    fn single_dot_attaches_to_the_preceding_cell() {
        let laid = cells("12.34");
        assert_eq!(laid[0], Cell { ch: '1', dot: false });
        assert_eq!(laid[1], Cell { ch: '2', dot: true });
        assert_eq!(laid[2], Cell { ch: '3', dot: false });
        assert_eq!(laid[3], Cell { ch: '4', dot: false });
        assert_eq!(laid[4], BLANK);
    }

    #[test]
    fn eight_characters_and_a_dot_still_fit() {
        let laid = cells("ABCD.EFG");
        assert_eq!(laid[3], Cell { ch: 'D', dot: true });
        assert_eq!(laid[4], Cell { ch: 'E', dot: false });
        assert_eq!(laid[7], BLANK);
    }

    #[test]
    fn overlong_text_drops_the_tail() {
        let laid = cells("ABCDEFGHI");
        assert_eq!(laid[7], Cell { ch: 'H', dot: false });
    }

    #[test]
    fn multiple_dots_keep_their_own_cells() {
        let laid = cells("1.2.3");
        assert_eq!(laid[0], Cell { ch: '1', dot: false });
        assert_eq!(laid[1], Cell { ch: ' ', dot: true });
        assert_eq!(laid[2], Cell { ch: '2', dot: false });
        assert_eq!(laid[3], Cell { ch: ' ', dot: true });
        assert_eq!(laid[4], Cell { ch: '3', dot: false });
    }

    #[test]
    fn short_text_pads_with_spaces() {
        let laid = cells("HI");
        assert_eq!(laid[0].ch, 'H');
        assert_eq!(laid[1].ch, 'I');
        for cell in &laid[2..] {
            assert_eq!(*cell, BLANK);
        }
    }

    #[test]
    fn unsupported_character_is_rejected() {
        assert_eq!(layout("abc"), Err(crate::ErrorCode::INVAL));
        assert_eq!(layout("12?4"), Err(crate::ErrorCode::INVAL));
    }

    #[test]
    fn rejected_text_never_touches_the_bank() {
        let bank = FakeBank::new();
        let encoder = Vim828::new(&bank);
        assert_eq!(
            encoder.display(Screen::Screen0, "HELLO!"),
            Err(crate::ErrorCode::INVAL)
        );
        assert_eq!(bank.writes.get(), 0);
    }

    #[test]
    fn display_writes_the_whole_image() {
        let bank = FakeBank::new();
        let encoder = Vim828::new(&bank);
        encoder.display(Screen::Screen0, "A").unwrap();
        assert_eq!(bank.writes.get(), NUM_DATA_REGISTERS);
        let regs = bank.screen0();
        assert_eq!(regs[7], 0x2700);
        assert_eq!(regs[0], 0x0046);
    }

    #[test]
    fn display_replaces_previous_content() {
        let bank = FakeBank::new();
        let encoder = Vim828::new(&bank);
        encoder.display(Screen::Screen0, "88888888").unwrap();
        encoder.display(Screen::Screen0, "        ").unwrap();
        assert_eq!(bank.screen0(), [0; NUM_DATA_REGISTERS]);
    }

    #[test]
    fn clear_blanks_the_screen() {
        let bank = FakeBank::new();
        let encoder = Vim828::new(&bank);
        encoder.display(Screen::Screen1, "MINUS--").unwrap();
        encoder.clear(Screen::Screen1);
        for index in 0..NUM_DATA_REGISTERS {
            assert_eq!(bank.data_register(Screen::Screen1, index), 0);
        }
    }
}
