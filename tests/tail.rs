mod common;

use std::fs::OpenOptions;
use std::io::{self, Cursor, Write};
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{counting_buffer, Event, Recorder};
use regex::Regex;
use tailplot::buffer::{Ingest, PointBuffer};
use tailplot::controllers::TailController;
use tailplot::data::field::FieldLayout;
use tailplot::data::point::Point;
use tailplot::flush::Flusher;
use tailplot::parser::{LineParser, RestartInference};
use tailplot::source::{FileSource, LineSource, ReadStatus, StreamSource};
use tailplot::tail::{PassEnd, Tailer};

fn comma_parser(header: bool) -> LineParser {
    LineParser::new(Regex::new(",").unwrap(), FieldLayout::default(), header)
}

fn p(x: f64, values: &[f64]) -> Point {
    Point::new(x, values.to_vec())
}

fn points(items: &[Ingest]) -> Vec<Point> {
    items
        .iter()
        .filter_map(|i| match i {
            Ingest::Point(p) => Some(p.clone()),
            _ => None,
        })
        .collect()
}

/// A file whose content is replaced by the next version once the reader has
/// consumed the current one.
struct ScriptedFile {
    versions: Vec<Vec<&'static str>>,
    open: usize,
    visible: usize,
    pos: usize,
    reopens: usize,
    /// Requests a restart the first time the reader runs out of data.
    restart_on_pending: Option<TailController>,
    /// Requests another restart from inside the first reopen.
    restart_on_reopen: Option<TailController>,
}

impl ScriptedFile {
    fn new(versions: Vec<Vec<&'static str>>) -> Self {
        Self {
            versions,
            open: 0,
            visible: 0,
            pos: 0,
            reopens: 0,
            restart_on_pending: None,
            restart_on_reopen: None,
        }
    }
}

impl LineSource for ScriptedFile {
    fn read_line(&mut self) -> io::Result<ReadStatus> {
        let lines = &self.versions[self.open];
        if self.open == self.visible && self.pos < lines.len() {
            self.pos += 1;
            return Ok(ReadStatus::Line(lines[self.pos - 1].to_string()));
        }
        if let Some(control) = self.restart_on_pending.take() {
            self.visible = (self.visible + 1).min(self.versions.len() - 1);
            control.request_restart();
            return Ok(ReadStatus::Pending);
        }
        if self.visible + 1 < self.versions.len() {
            self.visible += 1;
            return Ok(ReadStatus::Pending);
        }
        Ok(ReadStatus::Eof)
    }

    fn current_len(&self) -> io::Result<Option<u64>> {
        let len = self.versions[self.visible]
            .iter()
            .map(|l| l.len() as u64 + 1)
            .sum();
        Ok(Some(len))
    }

    fn reopen(&mut self) -> io::Result<()> {
        self.open = self.visible;
        self.pos = 0;
        self.reopens += 1;
        if let Some(control) = self.restart_on_reopen.take() {
            control.request_restart();
        }
        Ok(())
    }

    fn is_restartable(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn scripted_tailer(
    source: ScriptedFile,
    header: bool,
    control: TailController,
) -> (Tailer<ScriptedFile>, PointBuffer) {
    let (buffer, _) = counting_buffer();
    let tailer = Tailer::new(source, comma_parser(header), buffer.clone(), control)
        .with_poll_interval(Duration::from_millis(1));
    (tailer, buffer)
}

#[test]
fn truncation_restarts_from_the_beginning() {
    let source = ScriptedFile::new(vec![vec!["1,10", "2,20", "3,30"], vec!["5,50"]]);
    let (mut tailer, buffer) = scripted_tailer(source, false, TailController::new(true));
    tailer.run().unwrap();
    assert_eq!(tailer.sessions(), 2);

    let items = buffer.take_batch();
    let restart = items.iter().position(|i| *i == Ingest::Restart).unwrap();
    assert_eq!(
        points(&items[..restart]),
        vec![p(0.0, &[1.0, 10.0]), p(1.0, &[2.0, 20.0]), p(2.0, &[3.0, 30.0])]
    );
    assert!(matches!(items[restart + 1], Ingest::Fields(_)));
    assert_eq!(points(&items[restart..]), vec![p(0.0, &[5.0, 50.0])]);
}

#[test]
fn display_sees_restart_before_new_points() {
    let source = ScriptedFile::new(vec![vec!["1,10", "2,20", "3,30"], vec!["5,50"]]);
    let (mut tailer, buffer) = scripted_tailer(source, false, TailController::new(true));
    tailer.run().unwrap();

    let mut flusher = Flusher::new(buffer);
    let mut rec = Recorder::default();
    flusher.flush(&mut rec);
    let restart = rec.position(|e| *e == Event::Restart).unwrap();
    let new_batch = rec
        .position(|e| *e == Event::Batch(vec![p(0.0, &[5.0, 50.0])]))
        .unwrap();
    assert!(restart < new_batch);
    assert!(matches!(rec.events[restart + 1], Event::Fields(_)));
}

#[test]
fn truncation_is_ignored_without_auto_restart() {
    let source = ScriptedFile::new(vec![vec!["1,10", "2,20"], vec!["5,50"]]);
    let (mut tailer, buffer) = scripted_tailer(source, false, TailController::new(false));
    tailer.run().unwrap();
    assert_eq!(tailer.sessions(), 1);
    let items = buffer.take_batch();
    assert!(!items.contains(&Ingest::Restart));
    assert_eq!(points(&items).len(), 2);
}

#[test]
fn manual_restart_rereads_the_file() {
    let control = TailController::new(false);
    let mut source = ScriptedFile::new(vec![vec!["1,10"], vec!["1,10", "2,20"]]);
    source.restart_on_pending = Some(control.clone());
    let (mut tailer, buffer) = scripted_tailer(source, false, control);
    tailer.run().unwrap();
    assert_eq!(tailer.sessions(), 2);

    let items = buffer.take_batch();
    let restart = items.iter().position(|i| *i == Ingest::Restart).unwrap();
    assert_eq!(points(&items[..restart]), vec![p(0.0, &[1.0, 10.0])]);
    assert_eq!(
        points(&items[restart..]),
        vec![p(0.0, &[1.0, 10.0]), p(1.0, &[2.0, 20.0])]
    );
}

#[test]
fn restart_requested_while_reopening_is_absorbed() {
    let control = TailController::new(false);
    let mut source = ScriptedFile::new(vec![vec!["1,10"], vec!["1,10", "2,20"]]);
    source.restart_on_pending = Some(control.clone());
    source.restart_on_reopen = Some(control.clone());
    let (mut tailer, buffer) = scripted_tailer(source, false, control.clone());
    tailer.run().unwrap();
    assert_eq!(tailer.sessions(), 2);
    assert!(!control.restart_pending());

    let items = buffer.take_batch();
    assert_eq!(items.iter().filter(|i| **i == Ingest::Restart).count(), 1);
    assert_eq!(points(&items).len(), 3);
}

#[test]
fn header_is_skipped_again_after_restart() {
    let source = ScriptedFile::new(vec![vec!["t,v", "1,2", "3,4"], vec!["t,v", "9,9"]]);
    let (mut tailer, buffer) = scripted_tailer(source, true, TailController::new(true));
    tailer.run().unwrap();

    let items = buffer.take_batch();
    let fields: Vec<Vec<String>> = items
        .iter()
        .filter_map(|i| match i {
            Ingest::Fields(f) => Some(f.iter().map(|f| f.name.clone()).collect()),
            _ => None,
        })
        .collect();
    assert_eq!(fields, vec![vec!["t", "v"], vec!["t", "v"]]);
    assert_eq!(
        points(&items),
        vec![p(0.0, &[1.0, 2.0]), p(1.0, &[3.0, 4.0]), p(0.0, &[9.0, 9.0])]
    );
}

#[test]
fn reinference_after_restart_picks_up_new_columns() {
    let source = ScriptedFile::new(vec![vec!["1,2,3,4"], vec!["1,2"]]);
    let (tailer, buffer) = scripted_tailer(source, false, TailController::new(true));
    let mut tailer = tailer.with_restart_inference(RestartInference::Reinfer);
    tailer.run().unwrap();
    let items = buffer.take_batch();
    assert_eq!(
        points(&items),
        vec![p(0.0, &[1.0, 2.0, 3.0, 4.0]), p(0.0, &[1.0, 2.0])]
    );
}

#[test]
fn stream_ends_at_eof_and_ignores_restart_requests() {
    let control = TailController::new(true);
    control.request_restart();
    let (buffer, scheduler) = counting_buffer();
    let source = StreamSource::new(Cursor::new("1 2\n# note\n3 4\n5 6"), "test input");
    let parser = LineParser::new(
        Regex::new(tailplot::parser::DEFAULT_SEPARATOR).unwrap(),
        FieldLayout::default(),
        false,
    );
    let mut tailer = Tailer::new(source, parser, buffer.clone(), control.clone());
    tailer.run().unwrap();

    assert!(!control.restart_pending());
    assert_eq!(tailer.sessions(), 1);
    assert_eq!(tailer.parser().points(), 3);
    let items = buffer.take_batch();
    assert!(!items.contains(&Ingest::Restart));
    assert_eq!(
        points(&items),
        vec![p(0.0, &[1.0, 2.0]), p(1.0, &[3.0, 4.0]), p(2.0, &[5.0, 6.0])]
    );
    // Everything arrived before any flush, so only one was scheduled.
    assert_eq!(scheduler.get(), 1);
}

#[test]
fn shutdown_stops_before_reading() {
    let control = TailController::new(true);
    control.shutdown();
    let source = ScriptedFile::new(vec![vec!["1,10"]]);
    let (mut tailer, buffer) = scripted_tailer(source, false, control);
    assert_eq!(tailer.run_pass().unwrap(), PassEnd::Shutdown);
    assert!(buffer.is_empty());
}

#[test]
fn controller_wait_wakes_on_restart() {
    let control = TailController::new(false);
    let waker = control.clone();
    let start = Instant::now();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        waker.request_restart();
    });
    control.wait(Duration::from_secs(10));
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(control.take_restart());
    assert!(!control.take_restart());
    handle.join().unwrap();
}

#[test]
fn controller_restarts_only_on_shrink_with_auto_restart() {
    let control = TailController::new(true);
    assert!(!control.observe_len(10));
    assert!(!control.observe_len(20));
    assert!(control.observe_len(5));
    assert!(control.take_restart());

    control.set_auto_restart(false);
    assert!(!control.auto_restart());
    control.observe_len(50);
    assert!(!control.observe_len(1));
    assert!(!control.restart_pending());
}

// ─────────────────────────────────────────────────────────────────────────────
// Sources
// ─────────────────────────────────────────────────────────────────────────────

fn append(path: &Path, text: &str) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
}

#[test]
fn stream_source_strips_line_endings() {
    let mut source = StreamSource::new(Cursor::new("a\r\nb\nc"), "test");
    assert_eq!(source.read_line().unwrap(), ReadStatus::Line("a".into()));
    assert_eq!(source.read_line().unwrap(), ReadStatus::Line("b".into()));
    assert_eq!(source.read_line().unwrap(), ReadStatus::Line("c".into()));
    assert_eq!(source.read_line().unwrap(), ReadStatus::Eof);
    assert_eq!(source.read_line().unwrap(), ReadStatus::Eof);
    assert_eq!(source.current_len().unwrap(), None);
    assert!(!source.is_restartable());
    assert_eq!(
        source.reopen().unwrap_err().kind(),
        io::ErrorKind::Unsupported
    );
}

#[test]
fn file_source_holds_back_partial_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    std::fs::write(&path, "1,2\n3").unwrap();

    let mut source = FileSource::open(&path).unwrap();
    assert!(source.is_restartable());
    assert_eq!(source.path(), path.as_path());
    assert_eq!(source.read_line().unwrap(), ReadStatus::Line("1,2".into()));
    assert_eq!(source.read_line().unwrap(), ReadStatus::Pending);
    assert_eq!(source.read_line().unwrap(), ReadStatus::Pending);

    append(&path, "4\r\n");
    assert_eq!(source.read_line().unwrap(), ReadStatus::Line("34".into()));
    assert_eq!(source.current_len().unwrap(), Some(8));

    source.reopen().unwrap();
    assert_eq!(source.read_line().unwrap(), ReadStatus::Line("1,2".into()));
}

#[test]
fn file_source_reports_missing_file_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gone.csv");
    std::fs::write(&path, "1\n").unwrap();
    let source = FileSource::open(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(source.current_len().unwrap(), Some(0));
}

#[test]
fn opening_a_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = FileSource::open(dir.path().join("missing.csv")).err().unwrap();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}

// ─────────────────────────────────────────────────────────────────────────────
// End to end on a real file
// ─────────────────────────────────────────────────────────────────────────────

const TIMEOUT: Duration = Duration::from_secs(10);

struct Harness {
    rx: Receiver<()>,
    flusher: Flusher,
    rec: Recorder,
}

impl Harness {
    /// Flush whenever the reader schedules it, until `done` holds.
    fn wait_for(&mut self, done: impl Fn(&Recorder) -> bool) -> bool {
        let deadline = Instant::now() + TIMEOUT;
        loop {
            self.flusher.flush(&mut self.rec);
            if done(&self.rec) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let _ = self
                .rx
                .recv_timeout((deadline - now).min(Duration::from_millis(50)));
        }
    }
}

/// Points delivered since the last restart.
fn session_points(rec: &Recorder) -> Vec<Point> {
    let start = rec
        .events
        .iter()
        .rposition(|e| *e == Event::Restart)
        .map_or(0, |i| i + 1);
    rec.events[start..]
        .iter()
        .filter_map(|e| match e {
            Event::Batch(points) => Some(points.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}

fn restarts(rec: &Recorder) -> usize {
    rec.events.iter().filter(|e| **e == Event::Restart).count()
}

fn start_tailing(path: &Path) -> (Harness, TailController, thread::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let buffer = PointBuffer::new(Arc::new(tx));
    let control = TailController::new(true);
    let mut tailer = Tailer::new(
        FileSource::open(path).unwrap(),
        comma_parser(false),
        buffer.clone(),
        control.clone(),
    )
    .with_poll_interval(Duration::from_millis(10));
    let handle = thread::spawn(move || tailer.run().unwrap());
    let harness = Harness {
        rx,
        flusher: Flusher::new(buffer),
        rec: Recorder::default(),
    };
    (harness, control, handle)
}

#[test]
fn follows_a_growing_file_and_restarts_on_truncation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("growing.csv");
    std::fs::write(&path, "1,10\n2,20\n").unwrap();
    let (mut h, control, handle) = start_tailing(&path);

    assert!(h.wait_for(|r| session_points(r).len() == 2));

    append(&path, "3,3");
    thread::sleep(Duration::from_millis(100));
    h.flusher.flush(&mut h.rec);
    assert_eq!(session_points(&h.rec).len(), 2);

    append(&path, "0\n");
    assert!(h.wait_for(|r| session_points(r).len() == 3));
    assert_eq!(session_points(&h.rec)[2], p(2.0, &[3.0, 30.0]));

    std::fs::write(&path, "7,70\n").unwrap();
    assert!(h.wait_for(|r| restarts(r) == 1 && session_points(r) == vec![p(0.0, &[7.0, 70.0])]));

    control.shutdown();
    handle.join().unwrap();
}

#[test]
fn waits_for_a_rotated_file_to_reappear() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rotated.csv");
    std::fs::write(&path, "1,10\n").unwrap();
    let (mut h, control, handle) = start_tailing(&path);
    assert!(h.wait_for(|r| session_points(r).len() == 1));

    std::fs::remove_file(&path).unwrap();
    thread::sleep(Duration::from_millis(100));
    std::fs::write(&path, "9,90\n").unwrap();
    assert!(h.wait_for(|r| restarts(r) == 1 && session_points(r) == vec![p(0.0, &[9.0, 90.0])]));

    control.shutdown();
    handle.join().unwrap();
}

#[test]
fn manual_restart_of_a_real_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manual.csv");
    std::fs::write(&path, "1,10\n2,20\n").unwrap();
    let (mut h, control, handle) = start_tailing(&path);
    assert!(h.wait_for(|r| session_points(r).len() == 2));

    control.request_restart();
    assert!(h.wait_for(|r| restarts(r) == 1 && session_points(r).len() == 2));
    assert_eq!(session_points(&h.rec)[0], p(0.0, &[1.0, 10.0]));

    control.shutdown();
    handle.join().unwrap();
}
