use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command as StdCommand, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use assert_cmd::cargo::CommandCargoExt;
use assert_cmd::Command;

use abalone_core::{Board, Color, Value};
use abalone_player::comm::{decode_eval, read_frame, write_frame, TERMINATE_TAG};

#[test]
fn help_lists_strategies() {
    let mut cmd = Command::cargo_bin("abalone-player").expect("binary available");
    let output = cmd.arg("--help").assert().success().get_output().stdout.clone();
    let text = String::from_utf8_lossy(&output);

    assert!(text.contains("Strategy 'MinMax' (default)"), "strategy list missing: {}", text);
    assert!(text.contains("Strategy 'OneLevel'"), "strategy list missing: {}", text);
    assert!(!text.contains("worker-rank"), "hidden option shown: {}", text);
}

#[test]
fn bad_argument_prints_help() {
    let mut cmd = Command::cargo_bin("abalone-player").expect("binary available");
    let output = cmd.arg("Z").assert().failure().code(2).get_output().stderr.clone();
    let text = String::from_utf8_lossy(&output);
    assert!(text.contains("invalid argument 'Z'"), "error missing: {}", text);
    assert!(text.contains("Strategies:"), "help missing: {}", text);
}

#[test]
fn worker_process_answers_over_stdio() {
    let mut board = Board::new();
    board.play_move("A1/RightDown/move3".parse().unwrap(), 0);

    let mut input = Vec::new();
    write_frame(&mut input, 5, &board.to_bytes()).unwrap();
    write_frame(&mut input, TERMINATE_TAG, &[0]).unwrap();

    let mut cmd = Command::cargo_bin("abalone-player").expect("binary available");
    let output = cmd
        .args(["--worker-rank", "1", "--world-size", "2", "-s", "0", "1"])
        .write_stdin(input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let mut reader = output.as_slice();
    let (tag, payload) = read_frame(&mut reader).unwrap().expect("one reply");
    assert_eq!(tag, 5);
    let eval = decode_eval(&payload).unwrap();
    assert!(eval > Value::MIN_EVAL && eval < Value::MAX_EVAL, "eval {eval}");
    assert!(read_frame(&mut reader).unwrap().is_none(), "terminate must not be answered");
}

fn free_port() -> u16 {
    TcpListener::bind(("127.0.0.1", 0)).unwrap().local_addr().unwrap().port()
}

fn connect_with_retry(port: u16) -> TcpStream {
    let deadline = Instant::now() + Duration::from_secs(20);
    loop {
        match TcpStream::connect(("127.0.0.1", port)) {
            Ok(stream) => return stream,
            Err(e) if Instant::now() > deadline => panic!("player did not listen: {e}"),
            Err(_) => thread::sleep(Duration::from_millis(50)),
        }
    }
}

/// 局面を送り、1手指して quit を放送して終わることを確かめる。指した手の行を返す
fn play_one_move(start: &Board, extra: &[&str]) -> String {
    let port = free_port();
    let mut child = StdCommand::cargo_bin("abalone-player")
        .expect("binary available")
        .args(["O", "1", "-1", "-p", &port.to_string()])
        .args(extra)
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .unwrap();

    let stream = connect_with_retry(port);
    stream.set_read_timeout(Some(Duration::from_secs(30))).unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut writer = stream;
    writeln!(writer, "pos {}", start.state_string()).unwrap();

    let mut reply = String::new();
    reader.read_line(&mut reply).unwrap();
    let state = reply.strip_prefix("pos ").expect("position reply").trim_end();
    let board = Board::from_state(state).unwrap();
    assert_eq!(board.side_to_move(), Color::X);
    assert_eq!(board.move_no(), start.move_no() + 1);

    let mut quit = String::new();
    reader.read_line(&mut quit).unwrap();
    assert_eq!(quit, "quit\n");

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("Terminating because given number of moves drawn."), "{}", text);
    text.lines().find(|l| l.starts_with("O draws '")).expect("move line").to_string()
}

/// 定跡の初手が指せない局面（A1 が空いている）
fn out_of_book() -> Board {
    let mut board = Board::new();
    board.play_move("A1/RightDown/move3".parse().unwrap(), 0);
    board.play_move("I9/LeftUp/move3".parse().unwrap(), 0);
    Board::from_state(&board.state_string()).unwrap()
}

#[test]
fn plays_book_move_and_quits() {
    let line = play_one_move(&Board::new(), &[]);
    assert!(line.starts_with("O draws 'A1/RightDown/move3'"), "{}", line);
}

#[test]
fn plays_with_worker_threads() {
    let line = play_one_move(&out_of_book(), &["-w", "3"]);
    assert!(!line.contains("A1/RightDown/move3"), "{}", line);
}

#[test]
fn plays_with_worker_processes() {
    play_one_move(&out_of_book(), &["-w", "2", "--worker-mode", "processes"]);
}
