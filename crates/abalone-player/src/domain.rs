//! 対局ドメイン
//!
//! 放送チャネルから届く行を解釈する。`pos <局面>` で局面を受け取り、自分の手番なら
//! 手を決めて指し、新しい局面を放送する。`quit` でセッションを終える。

use std::time::Instant;

use crate::coordinator::CoordinatorError;
use crate::engine::{Engine, MoveSource};
use crate::network::{Action, LineHandler};

const POS_PREFIX: &str = "pos ";

pub struct PlayerDomain {
    engine: Engine,
    /// 残りの手数（None は無制限）
    moves_left: Option<u32>,
    /// 受け取った局面の持ち時間が 0 のときに使う持ち時間
    time_limit_ms: Option<u32>,
    /// 最後に自分が送った局面（新しい接続へ送る）
    last_sent: Option<String>,
}

impl PlayerDomain {
    pub fn new(engine: Engine) -> PlayerDomain {
        PlayerDomain { engine, moves_left: None, time_limit_ms: None, last_sent: None }
    }

    /// 指す手数の上限
    pub fn with_max_moves(mut self, moves: Option<u32>) -> PlayerDomain {
        self.moves_left = moves;
        self
    }

    pub fn with_time_limit(mut self, limit_ms: Option<u32>) -> PlayerDomain {
        self.time_limit_ms = limit_ms.filter(|&ms| ms > 0);
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn moves_left(&self) -> Option<u32> {
        self.moves_left
    }

    pub fn last_sent(&self) -> Option<&str> {
        self.last_sent.as_deref()
    }

    fn on_position(&mut self, state: &str) -> Result<Vec<Action>, CoordinatorError> {
        self.last_sent = None;
        if let Err(e) = self.engine.board_mut().set_state(state) {
            log::warn!("ignoring malformed position '{state}': {e}");
            return Ok(Vec::new());
        }
        if let Some(limit) = self.time_limit_ms
            && self.engine.board().time_limit_ms() == 0
        {
            self.engine.board_mut().set_time_limit_ms(limit);
        }
        log::info!("received position:\n{}", self.engine.board());

        let state = self.engine.board().state();
        if !state.is_valid() {
            println!("{}", state.description());
            return Ok(vec![Action::Exit]);
        }
        let color = self.engine.color();
        if self.engine.board().side_to_move() != color {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let Some((mv, source)) = self.engine.choose_move()? else {
            println!("{color}  can not draw any move ?! Sorry.");
            return Ok(Vec::new());
        };
        let elapsed = start.elapsed();
        let msecs = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);
        if source == MoveSource::Opening {
            log::debug!("{mv} taken from the opening book");
        }
        println!(
            "{color} draws '{mv}' (after {}.{:03} secs)...",
            msecs / 1000,
            msecs % 1000
        );

        self.engine.play(mv, msecs);
        let msg = format!("pos {}\n", self.engine.board().state_string());
        log::info!("sending {}", msg.trim_end());
        self.last_sent = Some(msg.clone());
        let mut actions = vec![Action::Broadcast(msg)];

        let state = self.engine.board().state();
        if !state.is_valid() {
            println!("{}", state.description());
            actions.push(Action::Exit);
            return Ok(actions);
        }

        if let Some(left) = self.moves_left.as_mut() {
            *left = left.saturating_sub(1);
            if *left == 0 {
                println!("Terminating because given number of moves drawn.");
                actions.push(Action::Broadcast("quit\n".to_string()));
                actions.push(Action::Exit);
            }
        }
        Ok(actions)
    }
}

impl LineHandler for PlayerDomain {
    type Error = CoordinatorError;

    fn on_line(&mut self, line: &str) -> Result<Vec<Action>, CoordinatorError> {
        if line.as_bytes().starts_with(b"quit") {
            return Ok(vec![Action::Exit]);
        }
        match line.strip_prefix(POS_PREFIX) {
            Some(state) => self.on_position(state),
            None => {
                log::trace!("ignoring line '{line}'");
                Ok(Vec::new())
            }
        }
    }

    fn on_connect(&mut self) -> Option<String> {
        self.last_sent.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abalone_core::{search, Board, Color, OpeningBook};

    fn domain(color: Color) -> PlayerDomain {
        let engine = Engine::new(color, search::create(0, 1).unwrap());
        PlayerDomain::new(engine)
    }

    fn pos(board: &Board) -> String {
        format!("pos {}", board.state_string())
    }

    #[test]
    fn test_quit_and_unknown_lines() {
        let mut d = domain(Color::O);
        assert_eq!(d.on_line("hello").unwrap(), vec![]);
        assert_eq!(d.on_line("position").unwrap(), vec![]);
        assert_eq!(d.on_line("quit").unwrap(), vec![Action::Exit]);
        assert_eq!(d.on_line("quitting now").unwrap(), vec![Action::Exit]);
    }

    #[test]
    fn test_malformed_position_is_ignored() {
        let mut d = domain(Color::O);
        assert_eq!(d.on_line("pos O 0 0 garbage").unwrap(), vec![]);
        assert_eq!(d.engine().board(), &Board::new());
    }

    #[test]
    fn test_opponent_turn_waits() {
        let mut d = domain(Color::X);
        assert_eq!(d.on_line(&pos(&Board::new())).unwrap(), vec![]);
        assert_eq!(d.last_sent(), None);
    }

    #[test]
    fn test_own_turn_plays_book_move() {
        let mut d = domain(Color::O);
        let actions = d.on_line(&pos(&Board::new())).unwrap();
        assert_eq!(actions.len(), 1);

        let mut expected = Board::new();
        expected.play_move("A1/RightDown/move3".parse().unwrap(), 0);
        let Action::Broadcast(msg) = &actions[0] else { panic!("expected broadcast") };
        let sent = Board::from_state(msg.strip_prefix("pos ").unwrap().trim_end()).unwrap();
        assert_eq!(sent.side_to_move(), Color::X);
        // 盤面部分は定跡の初手を指した局面と同じ
        assert_eq!(
            sent.state_string().rsplit_once(' ').map(|p| p.1.to_string()),
            expected.state_string().rsplit_once(' ').map(|p| p.1.to_string())
        );
        assert_eq!(d.on_connect().as_deref(), Some(msg.as_str()));
    }

    #[test]
    fn test_move_budget_sends_quit() {
        let engine = Engine::new(Color::O, search::create(0, 1).unwrap())
            .with_opening_book(OpeningBook::disabled());
        let mut d = PlayerDomain::new(engine).with_max_moves(Some(1));
        let actions = d.on_line(&pos(&Board::new())).unwrap();
        assert_eq!(actions.len(), 3);
        assert!(matches!(actions[0], Action::Broadcast(ref m) if m.starts_with("pos X ")));
        assert_eq!(actions[1], Action::Broadcast("quit\n".to_string()));
        assert_eq!(actions[2], Action::Exit);
        assert_eq!(d.moves_left(), Some(0));
    }

    #[test]
    fn test_terminal_position_exits() {
        let mut board = Board::new();
        for name in ["I5", "I6", "I7", "I8", "I9", "H4"] {
            board.set_field(abalone_core::Square::from_name(name).unwrap(), abalone_core::Field::Free);
        }
        board.set_side_to_move(Color::X);
        let mut d = domain(Color::X);
        assert_eq!(d.on_line(&pos(&board)).unwrap(), vec![Action::Exit]);
    }

    #[test]
    fn test_time_limit_applies_to_unlimited_positions() {
        let mut d = domain(Color::X).with_time_limit(Some(60_000));
        d.on_line(&pos(&Board::new())).unwrap();
        assert_eq!(d.engine().board().time_limit_ms(), 60_000);
    }
}
