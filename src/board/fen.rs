//! FEN parsing and serialization. Six-field standard notation; the halfmove
//! and fullmove fields may be absent (the fullmove field is ignored either
//! way).

use super::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece, Position};
use crate::square::Square;

impl Position {
    /// Builds a position from a FEN string, validating that both kings are
    /// present. Returns an error without partially-built state on failure.
    pub fn from_fen(fen: &str) -> Result<Position, String> {
        let mut fields = fen.split_whitespace();

        let placement = fields.next().ok_or("empty FEN")?;
        let side = fields.next().ok_or("FEN missing side to move")?;
        let castling = fields.next().ok_or("FEN missing castling rights")?;
        let en_passant = fields.next().ok_or("FEN missing en passant field")?;
        let halfmove = fields.next();

        let mut pos = Position::default();

        let mut rank: i32 = 7;
        let mut file: i32 = 0;
        for c in placement.chars() {
            match c {
                '/' => {
                    rank -= 1;
                    file = 0;
                }
                '1'..='8' => file += c as i32 - '0' as i32,
                _ => {
                    let piece =
                        Piece::from_char(c).ok_or_else(|| format!("bad FEN piece: {c}"))?;
                    if !(0..8).contains(&rank) || !(0..8).contains(&file) {
                        return Err(format!("FEN placement overflows the board: {placement}"));
                    }
                    pos.set_piece(
                        piece.color(),
                        piece.piece_type(),
                        Square::new(rank as u8, file as u8),
                    );
                    file += 1;
                }
            }
        }

        pos.side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(format!("bad FEN side to move: {side}")),
        };

        if castling != "-" {
            for c in castling.chars() {
                pos.castling_rights |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    _ => return Err(format!("bad FEN castling rights: {castling}")),
                };
            }
        }

        pos.en_passant_square = if en_passant == "-" {
            Square::NONE
        } else {
            en_passant.parse::<Square>()?
        };

        if let Some(h) = halfmove {
            pos.half_move_counter = h
                .parse::<u16>()
                .map_err(|_| format!("bad FEN halfmove clock: {h}"))?;
        }

        if pos.white.king().count_ones() != 1 || pos.black.king().count_ones() != 1 {
            return Err(format!("FEN must place exactly one king per side: {fen}"));
        }

        pos.hash = pos.compute_hash();
        Ok(pos)
    }

    /// Resets this position from a FEN string; untouched on error.
    pub fn load_from_fen(&mut self, fen: &str) -> Result<(), String> {
        *self = Position::from_fen(fen)?;
        Ok(())
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                let piece = self.piece_at(Square::new(rank, file));
                if piece.is_none() {
                    empty += 1;
                } else {
                    if empty > 0 {
                        fen.push((b'0' + empty) as char);
                        empty = 0;
                    }
                    fen.push(piece.to_char());
                }
            }
            if empty > 0 {
                fen.push((b'0' + empty) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.castling_rights == 0 {
            fen.push('-');
        } else {
            if self.castling_rights & CASTLE_WK != 0 {
                fen.push('K');
            }
            if self.castling_rights & CASTLE_WQ != 0 {
                fen.push('Q');
            }
            if self.castling_rights & CASTLE_BK != 0 {
                fen.push('k');
            }
            if self.castling_rights & CASTLE_BQ != 0 {
                fen.push('q');
            }
        }

        fen.push(' ');
        if self.en_passant_square.is_none() {
            fen.push('-');
        } else {
            fen.push_str(&self.en_passant_square.to_string());
        }

        fen.push_str(&format!(" {} 1", self.half_move_counter));
        fen
    }
}
