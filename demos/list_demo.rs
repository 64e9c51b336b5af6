//! List Demo: A live job list fed faster than it is drawn.
//!
//! A producer thread publishes a fresh snapshot of the job table every few
//! milliseconds. The differ conflates the bursts, and the main loop drains
//! the edit operations to highlight rows that were inserted or changed.
//!
//! Press 'q' or Escape to quit. Run with `RUST_LOG=debug` to see the
//! pipeline log in `list_demo.log`.

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use flywheel_list::{
    display_channel, AsyncListDiffer, DisplayReceiver, KeyComparator, ListUpdateCallback, Sequence,
};
use std::fs::File;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How many frames a touched row stays highlighted.
const HIGHLIGHT_FRAMES: u8 = 12;

#[derive(Debug, Clone, PartialEq)]
struct Job {
    id: u32,
    name: String,
    progress: u8,
}

/// Tiny deterministic generator so the demo needs no extra crates.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, range: u32) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        u32::try_from(self.0 >> 33).unwrap_or(0) % range
    }
}

/// Advance the simulated job table by one tick.
fn tick(jobs: &mut Vec<Job>, rng: &mut Lcg, next_id: &mut u32) {
    for job in jobs.iter_mut() {
        if rng.next(3) == 0 {
            job.progress = job.progress.saturating_add(u8::try_from(rng.next(9)).unwrap_or(1));
        }
    }
    jobs.retain(|job| job.progress < 100);
    if jobs.len() < 18 && rng.next(4) == 0 {
        jobs.push(Job {
            id: *next_id,
            name: format!("job-{next_id:04}"),
            progress: 0,
        });
        *next_id += 1;
    }
    if rng.next(40) == 0 {
        jobs.sort_by(|a, b| b.progress.cmp(&a.progress));
    }
}

/// Highlight ages tracked from the operation stream.
struct Highlights(Vec<u8>);

impl ListUpdateCallback<()> for Highlights {
    fn on_inserted(&mut self, position: usize, count: usize) {
        let position = position.min(self.0.len());
        let tail = self.0.split_off(position);
        self.0.extend(std::iter::repeat(HIGHLIGHT_FRAMES).take(count));
        self.0.extend(tail);
    }

    fn on_removed(&mut self, position: usize, count: usize) {
        let end = (position + count).min(self.0.len());
        self.0.drain(position.min(end)..end);
    }

    fn on_moved(&mut self, from: usize, to: usize) {
        if from < self.0.len() {
            let age = self.0.remove(from);
            self.0.insert(to.min(self.0.len()), age.max(HIGHLIGHT_FRAMES / 2));
        }
    }

    fn on_changed(&mut self, position: usize, count: usize, _payload: Option<()>) {
        for age in self.0.iter_mut().skip(position).take(count) {
            *age = HIGHLIGHT_FRAMES;
        }
    }
}

impl Highlights {
    fn fade(&mut self) {
        for age in &mut self.0 {
            *age = age.saturating_sub(1);
        }
    }
}

/// Restores the terminal when dropped, even on early return.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn draw(
    out: &mut impl Write,
    differ: &AsyncListDiffer<Job>,
    highlights: &Highlights,
    frame: u64,
) -> io::Result<()> {
    let current: Sequence<Job> = differ.current();
    let stats = differ.stats();

    queue!(
        out,
        cursor::MoveTo(0, 0),
        terminal::Clear(ClearType::All),
        Print(format!(
            "Flywheel List Demo  frame {frame}  submitted {}  conflated {}  diffs {}",
            stats.submitted, stats.conflated, stats.diffs_computed
        )),
        cursor::MoveTo(0, 1),
        Print("Press 'q' or Escape to quit."),
    )?;

    for (row, job) in current.iter().enumerate() {
        let age = highlights.0.get(row).copied().unwrap_or(0);
        let color = if age > 0 { Color::Yellow } else { Color::Grey };
        let filled = usize::from(job.progress / 5);
        let line = format!(
            "{:<10} [{:<20}] {:>3}%",
            job.name,
            "#".repeat(filled),
            job.progress
        );
        queue!(
            out,
            cursor::MoveTo(0, u16::try_from(row + 3).unwrap_or(u16::MAX)),
            SetForegroundColor(color),
            Print(line),
            ResetColor,
        )?;
    }

    out.flush()
}

fn spawn_producer(
    differ: Arc<AsyncListDiffer<Job>>,
    running: Arc<AtomicBool>,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("list-demo-producer".to_string())
        .spawn(move || {
            let mut rng = Lcg(0x5eed);
            let mut next_id = 0;
            let mut jobs = Vec::new();
            while running.load(Ordering::Relaxed) {
                tick(&mut jobs, &mut rng, &mut next_id);
                differ.update(Some(Sequence::from(jobs.clone())));
                thread::sleep(Duration::from_millis(4));
            }
        })
}

fn run(receiver: &DisplayReceiver<()>, differ: &AsyncListDiffer<Job>) -> io::Result<()> {
    let frame_time = Duration::from_millis(33);
    let mut highlights = Highlights(Vec::new());
    let mut stdout = io::stdout();
    let mut frame = 0_u64;

    loop {
        let started = Instant::now();

        if event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
                {
                    return Ok(());
                }
            }
        }

        highlights.fade();
        receiver.drain_into(&mut highlights);
        draw(&mut stdout, differ, &highlights, frame)?;
        frame += 1;

        if let Some(rest) = frame_time.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
}

fn main() -> io::Result<()> {
    // Logs go to a file so they don't tear the alternate screen
    let log_file = File::create("list_demo.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let (display, receiver) = display_channel();
    let differ = Arc::new(
        AsyncListDiffer::builder(display, KeyComparator::new(|job: &Job| job.id)).spawn()?,
    );
    let running = Arc::new(AtomicBool::new(true));
    let producer = spawn_producer(Arc::clone(&differ), Arc::clone(&running))?;

    let result = {
        let _guard = TerminalGuard::enter()?;
        run(&receiver, &differ)
    };

    running.store(false, Ordering::Relaxed);
    let _ = producer.join();
    let stats = differ.stats();
    println!(
        "submitted {} updates, {} conflated, {} diffs computed",
        stats.submitted, stats.conflated, stats.diffs_computed
    );
    result
}
