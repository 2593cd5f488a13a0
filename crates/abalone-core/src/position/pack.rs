//! 局面の固定長バイナリ表現（ワーカーへの転送用）
//!
//! | オフセット | 長さ | 内容 |
//! |---|---|---|
//! | 0 | 1 | 手番（0 = O, 1 = X） |
//! | 1 | 2 | 手数（u16 LE） |
//! | 3 | 4 | O の消費時間 ms（u32 LE） |
//! | 7 | 4 | X の消費時間 ms（u32 LE） |
//! | 11 | 4 | 持ち時間 ms（u32 LE） |
//! | 15 | 16 | 61 升 × 2 bit（升インデックス昇順、下位ビットから） |
//!
//! 巻き戻し履歴は含まない。

use byteorder::{ByteOrder, LittleEndian};

use crate::types::{Color, Square};

use super::board::{Board, Field};
use super::state::StateError;

const CELLS_OFFSET: usize = 15;

impl Board {
    /// バイナリ表現のバイト数
    pub const SIZE: usize = CELLS_OFFSET + 16;

    pub fn pack(&self, buf: &mut [u8; Board::SIZE]) {
        buf.fill(0);
        buf[0] = self.side_to_move as u8;
        LittleEndian::write_u16(&mut buf[1..3], self.move_no);
        LittleEndian::write_u32(&mut buf[3..7], self.msecs_used[Color::O.index()]);
        LittleEndian::write_u32(&mut buf[7..11], self.msecs_used[Color::X.index()]);
        LittleEndian::write_u32(&mut buf[11..15], self.time_limit_ms);
        for (i, sq) in Square::cells().enumerate() {
            let code = match self.field(sq) {
                Field::O => 1u8,
                Field::X => 2,
                _ => 0,
            };
            buf[CELLS_OFFSET + i / 4] |= code << ((i % 4) * 2);
        }
    }

    /// 送信用のバッファを新しく確保して詰める
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = [0u8; Board::SIZE];
        self.pack(&mut buf);
        buf.to_vec()
    }

    pub fn unpack(bytes: &[u8]) -> Result<Board, StateError> {
        if bytes.len() != Board::SIZE {
            return Err(StateError::Length {
                expected: Board::SIZE,
                actual: bytes.len(),
            });
        }
        let side =
            Color::from_u8(bytes[0]).ok_or_else(|| StateError::Side(bytes[0].to_string()))?;

        let mut board = Board::empty();
        for (i, sq) in Square::cells().enumerate() {
            let code = (bytes[CELLS_OFFSET + i / 4] >> ((i % 4) * 2)) & 0b11;
            board.fields[sq.index()] = match code {
                0 => Field::Free,
                1 => Field::O,
                2 => Field::X,
                other => return Err(StateError::CellCode(other)),
            };
        }
        board.side_to_move = side;
        board.move_no = LittleEndian::read_u16(&bytes[1..3]);
        board.msecs_used = [
            LittleEndian::read_u32(&bytes[3..7]),
            LittleEndian::read_u32(&bytes[7..11]),
        ];
        board.time_limit_ms = LittleEndian::read_u32(&bytes[11..15]);
        board.recount_balls();
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NUM_CELLS;

    #[test]
    fn test_size_fits_all_cells() {
        assert_eq!(Board::SIZE, 31);
        assert!((Board::SIZE - CELLS_OFFSET) * 4 >= NUM_CELLS);
    }

    #[test]
    fn test_pack_preserves_position() {
        let mut b = Board::new();
        b.set_time_limit_ms(90_000);
        b.play_move("A2/RightDown/move3".parse().unwrap(), 321);
        let bytes = b.to_bytes();
        assert_eq!(bytes.len(), Board::SIZE);
        assert_eq!(bytes[0], 1);

        let restored = Board::unpack(&bytes).unwrap();
        assert_eq!(restored, b);
        assert_eq!(restored.balls(Color::O), 14);
        assert_eq!(restored.history_len(), 0);
    }

    #[test]
    fn test_unpack_rejects_bad_input() {
        let bytes = Board::new().to_bytes();
        assert_eq!(
            Board::unpack(&bytes[..30]),
            Err(StateError::Length { expected: 31, actual: 30 })
        );

        let mut bad_side = bytes.clone();
        bad_side[0] = 7;
        assert!(matches!(Board::unpack(&bad_side), Err(StateError::Side(_))));

        let mut bad_cell = bytes;
        bad_cell[CELLS_OFFSET] |= 0b11;
        assert_eq!(Board::unpack(&bad_cell), Err(StateError::CellCode(3)));
    }
}
