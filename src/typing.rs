// ⌨️ Simulated Response Renderer - typing effects as timed keyframes
//
// Nothing here waits on real I/O. A "response" is a canned string turned
// into a lazy stream of keyframes: at time T, write X into container Y.
// Streams are merged on a timeline and played onto a surface.

use crate::config::AnimationConfig;
use crate::markup::TYPING_CURSOR;
use crate::state::RunTicket;
use crate::surface::{Surface, Update};
use rand::Rng;
use serde::{Serialize, Serializer};
use std::iter::Peekable;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// KEYFRAME
// ============================================================================

/// A single timed update. `at` is relative to the start of the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyframe {
    #[serde(rename = "at_ms", serialize_with = "serialize_millis")]
    pub at: Duration,
    pub target: String,
    pub update: Update,
}

impl Keyframe {
    pub fn new(at: Duration, target: impl Into<String>, update: Update) -> Self {
        Keyframe {
            at,
            target: target.into(),
            update,
        }
    }

    pub fn html(at: Duration, target: impl Into<String>, html: impl Into<String>) -> Self {
        Keyframe::new(at, target, Update::Html(html.into()))
    }
}

fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

pub type KeyframeStream = Box<dyn Iterator<Item = Keyframe> + Send>;

// ============================================================================
// CANCELLATION
// ============================================================================

/// Shared stop flag. Every stream holding a clone ends once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

// ============================================================================
// TYPEWRITER
// ============================================================================

/// Reveals a text one character at a time.
///
/// Char `i` is written at `start + delay * i`. With the cursor enabled
/// intermediate frames end in the typing cursor and a final cursor-less
/// frame follows one `delay` after the last character.
#[derive(Debug, Clone)]
pub struct Typewriter {
    target: String,
    chars: Vec<char>,
    delay: Duration,
    start: Duration,
    cursor: bool,
    tag_aware: bool,
    pos: usize,
    steps: u32,
    finished: bool,
    cancel: Option<CancelToken>,
}

impl Typewriter {
    pub fn new(target: impl Into<String>, text: &str, delay: Duration) -> Self {
        Typewriter {
            target: target.into(),
            chars: text.chars().collect(),
            delay,
            start: Duration::ZERO,
            cursor: false,
            tag_aware: false,
            pos: 0,
            steps: 0,
            finished: false,
            cancel: None,
        }
    }

    pub fn starting_at(mut self, start: Duration) -> Self {
        self.start = start;
        self
    }

    pub fn with_cursor(mut self) -> Self {
        self.cursor = true;
        self
    }

    /// Write whole `<...>` tags in a single step
    pub fn tag_aware(mut self) -> Self {
        self.tag_aware = true;
        self
    }

    pub fn cancellable(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Number of character steps (tags count as one step when tag-aware)
    pub fn step_count(&self) -> u32 {
        let mut walker = Typewriter {
            cancel: None,
            cursor: false,
            ..self.clone()
        };
        walker.pos = 0;
        let mut steps = 0;
        while walker.pos < walker.chars.len() {
            walker.advance();
            steps += 1;
        }
        steps
    }

    /// Time from `start` until the text is fully revealed
    pub fn duration(&self) -> Duration {
        self.delay * self.step_count()
    }

    fn advance(&mut self) {
        if self.tag_aware && self.chars[self.pos] == '<' {
            if let Some(close) = self.chars[self.pos..].iter().position(|&c| c == '>') {
                self.pos += close + 1;
                return;
            }
        }
        self.pos += 1;
    }

    fn prefix(&self) -> String {
        self.chars[..self.pos].iter().collect()
    }
}

impl Iterator for Typewriter {
    type Item = Keyframe;

    fn next(&mut self) -> Option<Keyframe> {
        if self.finished {
            return None;
        }
        if self.cancel.as_ref().map_or(false, |c| c.is_cancelled()) {
            self.finished = true;
            return None;
        }

        let at = self.start + self.delay * self.steps;

        if self.pos < self.chars.len() {
            self.advance();
            self.steps += 1;
            let html = if self.cursor {
                format!("{}{}", self.prefix(), TYPING_CURSOR)
            } else {
                self.prefix()
            };
            if !self.cursor && self.pos == self.chars.len() {
                self.finished = true;
            }
            return Some(Keyframe::html(at, self.target.clone(), html));
        }

        // Final frame: full text, cursor removed (also covers empty text)
        self.finished = true;
        Some(Keyframe::html(at, self.target.clone(), self.prefix()))
    }
}

// ============================================================================
// COUNTER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    /// `1 - (1 - p)^3`
    EaseOutCubic,
}

impl Easing {
    pub fn apply(&self, progress: f64) -> f64 {
        match self {
            Easing::Linear => progress,
            Easing::EaseOutCubic => 1.0 - (1.0 - progress).powi(3),
        }
    }
}

/// Animates a number toward a precomputed final value.
///
/// The first tick fires one `tick` after `start`; the last frame is exactly `to`.
#[derive(Debug, Clone)]
pub struct Counter {
    target: String,
    from: f64,
    to: f64,
    duration: Duration,
    tick: Duration,
    decimals: usize,
    prefix: String,
    suffix: String,
    easing: Easing,
    start: Duration,
    ticks: u32,
    finished: bool,
    cancel: Option<CancelToken>,
}

impl Counter {
    pub fn new(target: impl Into<String>, from: f64, to: f64, duration: Duration) -> Self {
        Counter {
            target: target.into(),
            from,
            to,
            duration,
            tick: Duration::from_millis(50),
            decimals: 4,
            prefix: String::new(),
            suffix: String::new(),
            easing: Easing::Linear,
            start: Duration::ZERO,
            ticks: 0,
            finished: false,
            cancel: None,
        }
    }

    pub fn tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(Duration::from_millis(1));
        self
    }

    pub fn decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn starting_at(mut self, start: Duration) -> Self {
        self.start = start;
        self
    }

    pub fn cancellable(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn render(&self, value: f64) -> String {
        format!("{}{:.*}{}", self.prefix, self.decimals, value, self.suffix)
    }
}

impl Iterator for Counter {
    type Item = Keyframe;

    fn next(&mut self) -> Option<Keyframe> {
        if self.finished {
            return None;
        }
        if self.cancel.as_ref().map_or(false, |c| c.is_cancelled()) {
            self.finished = true;
            return None;
        }

        if self.duration.is_zero() {
            self.finished = true;
            return Some(Keyframe::new(
                self.start,
                self.target.clone(),
                Update::Text(self.render(self.to)),
            ));
        }

        self.ticks += 1;
        let elapsed = self.tick * self.ticks;
        let progress = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0);

        let value = if progress >= 1.0 {
            self.finished = true;
            self.to
        } else {
            self.from + (self.to - self.from) * self.easing.apply(progress)
        };

        Some(Keyframe::new(
            self.start + elapsed,
            self.target.clone(),
            Update::Text(self.render(value)),
        ))
    }
}

// ============================================================================
// TIMELINE
// ============================================================================

/// Lazily merges keyframe streams into one stream ordered by time.
///
/// Equal times keep stream order (earlier-pushed streams first).
#[derive(Default)]
pub struct Timeline {
    streams: Vec<Peekable<KeyframeStream>>,
    cancel: Option<CancelToken>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<I>(&mut self, stream: I)
    where
        I: Iterator<Item = Keyframe> + Send + 'static,
    {
        let boxed: KeyframeStream = Box::new(stream);
        self.streams.push(boxed.peekable());
    }

    pub fn with<I>(mut self, stream: I) -> Self
    where
        I: Iterator<Item = Keyframe> + Send + 'static,
    {
        self.push(stream);
        self
    }

    /// Single keyframe at a fixed time
    pub fn push_frame(&mut self, frame: Keyframe) {
        self.push(std::iter::once(frame));
    }

    /// Stop the whole timeline when the token is cancelled
    pub fn cancellable(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn peek_at(&mut self) -> Option<Duration> {
        self.streams
            .iter_mut()
            .filter_map(|s| s.peek().map(|f| f.at))
            .min()
    }

    /// Drain into a precomputed script (what the server sends to browsers)
    pub fn into_script(self) -> Vec<Keyframe> {
        self.collect()
    }
}

impl Iterator for Timeline {
    type Item = Keyframe;

    fn next(&mut self) -> Option<Keyframe> {
        if self.cancel.as_ref().map_or(false, |c| c.is_cancelled()) {
            self.streams.clear();
            return None;
        }

        let mut best: Option<(usize, Duration)> = None;
        for (i, stream) in self.streams.iter_mut().enumerate() {
            if let Some(frame) = stream.peek() {
                if best.map_or(true, |(_, at)| frame.at < at) {
                    best = Some((i, frame.at));
                }
            }
        }

        best.and_then(|(i, _)| self.streams[i].next())
    }
}

/// Time of the last keyframe in a script
pub fn script_duration(script: &[Keyframe]) -> Duration {
    script.iter().map(|f| f.at).max().unwrap_or_default()
}

// ============================================================================
// PLAYBACK
// ============================================================================

pub trait Clock {
    fn sleep(&mut self, duration: Duration);
}

/// Real wall-clock sleeping
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Never sleeps; only accumulates how long it would have slept.
#[derive(Debug, Default)]
pub struct InstantClock {
    pub slept: Duration,
}

impl Clock for InstantClock {
    fn sleep(&mut self, duration: Duration) {
        self.slept += duration;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    pub applied: usize,
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Apply keyframes in order, sleeping between them.
///
/// Keyframes whose container is missing are skipped.
pub fn play<I, S, C>(frames: I, surface: &mut S, clock: &mut C) -> PlaybackStats
where
    I: IntoIterator<Item = Keyframe>,
    S: Surface + ?Sized,
    C: Clock + ?Sized,
{
    let mut stats = PlaybackStats::default();

    for frame in frames {
        if frame.at > stats.elapsed {
            clock.sleep(frame.at - stats.elapsed);
            stats.elapsed = frame.at;
        }
        if surface.write(&frame.target, &frame.update) {
            stats.applied += 1;
        } else {
            stats.skipped += 1;
        }
    }

    stats
}

/// Incremental playback for event loops that cannot block (the TUI).
///
/// Holds the run's ticket so the module stays busy until the last frame.
pub struct Playback {
    timeline: Timeline,
    ticket: Option<RunTicket>,
}

impl Playback {
    pub fn new(timeline: Timeline, ticket: Option<RunTicket>) -> Self {
        Playback { timeline, ticket }
    }

    /// Apply every keyframe due at `elapsed`. Returns true once finished.
    pub fn advance<S: Surface + ?Sized>(&mut self, elapsed: Duration, surface: &mut S) -> bool {
        while let Some(at) = self.timeline.peek_at() {
            if at > elapsed {
                return false;
            }
            if let Some(frame) = self.timeline.next() {
                surface.write(&frame.target, &frame.update);
            }
        }
        self.ticket.take();
        true
    }

    pub fn is_finished(&mut self) -> bool {
        self.timeline.peek_at().is_none()
    }
}

// ============================================================================
// ARTIFICIAL LATENCY
// ============================================================================

/// Random "analyzing..." delay within the configured bounds, zero when animation is off
pub fn loader_delay<R: Rng + ?Sized>(rng: &mut R, config: &AnimationConfig) -> Duration {
    if !config.enabled {
        return Duration::ZERO;
    }
    let ms = if config.loader_min_ms >= config.loader_max_ms {
        config.loader_min_ms
    } else {
        rng.gen_range(config.loader_min_ms..=config.loader_max_ms)
    };
    Duration::from_millis(ms)
}

/// Plain typing effect without cursor
pub fn type_text(target: &str, text: &str, delay: Duration) -> Typewriter {
    Typewriter::new(target, text, delay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn html(frame: &Keyframe) -> &str {
        match &frame.update {
            Update::Html(h) | Update::Text(h) | Update::Class(h) => h,
        }
    }

    #[test]
    fn test_typewriter_with_cursor() {
        let frames: Vec<Keyframe> = Typewriter::new("out", "abc", ms(15)).with_cursor().collect();

        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].at, ms(0));
        assert_eq!(html(&frames[0]), format!("a{}", TYPING_CURSOR));
        assert_eq!(frames[2].at, ms(30));
        assert_eq!(html(&frames[2]), format!("abc{}", TYPING_CURSOR));
        assert_eq!(frames[3].at, ms(45));
        assert_eq!(html(&frames[3]), "abc");
    }

    #[test]
    fn test_typewriter_without_cursor_ends_on_last_char() {
        let frames: Vec<Keyframe> = type_text("out", "hey", ms(10)).collect();
        assert_eq!(frames.len(), 3);
        assert_eq!(html(frames.last().unwrap()), "hey");
        assert_eq!(frames.last().unwrap().at, ms(20));
    }

    #[test]
    fn test_typewriter_multibyte_chars() {
        let frames: Vec<Keyframe> = type_text("out", "né✓", ms(1)).collect();
        let texts: Vec<&str> = frames.iter().map(html).collect();
        assert_eq!(texts, vec!["n", "né", "né✓"]);
    }

    #[test]
    fn test_typewriter_tag_aware() {
        let text = r#"a<span class="x">b</span>"#;
        let frames: Vec<Keyframe> = type_text("out", text, ms(8)).tag_aware().collect();
        let texts: Vec<&str> = frames.iter().map(html).collect();

        assert_eq!(
            texts,
            vec![
                "a",
                r#"a<span class="x">"#,
                r#"a<span class="x">b"#,
                r#"a<span class="x">b</span>"#,
            ]
        );
        assert_eq!(type_text("out", text, ms(8)).tag_aware().step_count(), 4);
    }

    #[test]
    fn test_typewriter_empty_text() {
        let frames: Vec<Keyframe> = Typewriter::new("out", "", ms(10)).with_cursor().collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(html(&frames[0]), "");
    }

    #[test]
    fn test_typewriter_start_offset_and_duration() {
        let writer = type_text("out", "abcd", ms(12)).starting_at(ms(1500));
        assert_eq!(writer.duration(), ms(48));
        let first = writer.clone().next().unwrap();
        assert_eq!(first.at, ms(1500));
    }

    #[test]
    fn test_typewriter_cancel() {
        let token = CancelToken::new();
        let mut writer = type_text("out", "abcdef", ms(5)).cancellable(token.clone());

        assert!(writer.next().is_some());
        assert!(writer.next().is_some());
        token.cancel();
        assert!(writer.next().is_none());
        assert!(writer.next().is_none());
    }

    #[test]
    fn test_counter_linear_reaches_exact_total() {
        let frames: Vec<Keyframe> = Counter::new("cost", 0.0, 0.02, ms(200))
            .prefix("$")
            .decimals(4)
            .collect();

        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].at, ms(50));
        assert_eq!(html(&frames[0]), "$0.0050");
        assert_eq!(html(&frames[3]), "$0.0200");
        assert_eq!(frames[3].at, ms(200));
    }

    #[test]
    fn test_counter_ease_out_is_ahead_of_linear() {
        let eased = Easing::EaseOutCubic.apply(0.5);
        assert!((eased - 0.875).abs() < 1e-9);
        assert_eq!(Easing::EaseOutCubic.apply(1.0), 1.0);
    }

    #[test]
    fn test_counter_zero_duration() {
        let frames: Vec<Keyframe> = Counter::new("n", 0.0, 5.0, Duration::ZERO).decimals(0).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(html(&frames[0]), "5");
    }

    #[test]
    fn test_timeline_interleaves_by_time() {
        let timeline = Timeline::new()
            .with(type_text("api", "abc", ms(15)))
            .with(type_text("slm", "abc", ms(10)));

        let frames: Vec<Keyframe> = timeline.collect();
        assert_eq!(frames.len(), 6);
        for pair in frames.windows(2) {
            assert!(pair[0].at <= pair[1].at);
        }
        // tie at t=0: the stream pushed first wins
        assert_eq!(frames[0].target, "api");
        assert_eq!(frames[1].target, "slm");
    }

    #[test]
    fn test_timeline_cancel() {
        let token = CancelToken::new();
        let mut timeline = Timeline::new()
            .with(type_text("a", "abcdef", ms(1)))
            .cancellable(token.clone());

        assert!(timeline.next().is_some());
        token.cancel();
        assert!(timeline.next().is_none());
    }

    #[test]
    fn test_play_skips_missing_targets() {
        let timeline = Timeline::new()
            .with(type_text("api", "ab", ms(10)))
            .with(type_text("gone", "ab", ms(10)));

        let mut surface = MemorySurface::with_targets(["api"]);
        let mut clock = InstantClock::default();
        let stats = play(timeline, &mut surface, &mut clock);

        assert_eq!(stats.applied, 2);
        assert_eq!(stats.skipped, 2);
        assert_eq!(clock.slept, ms(10));
        assert_eq!(surface.html("api"), Some("ab"));
    }

    #[test]
    fn test_system_clock_waits_for_keyframes() {
        let mut surface = MemorySurface::with_targets(["api"]);
        let started = std::time::Instant::now();
        let stats = play(type_text("api", "abc", ms(5)), &mut surface, &mut SystemClock);

        assert_eq!(stats.elapsed, ms(10));
        assert!(started.elapsed() >= ms(10));
        assert_eq!(surface.html("api"), Some("abc"));
    }

    #[test]
    fn test_incremental_playback_releases_ticket() {
        let guard = crate::state::RunGuard::default();
        let ticket = guard.try_start().unwrap();
        let timeline = Timeline::new().with(type_text("out", "abc", ms(10)));

        let mut playback = Playback::new(timeline, Some(ticket));
        let mut surface = MemorySurface::with_targets(["out"]);

        assert!(!playback.advance(ms(5), &mut surface));
        assert_eq!(surface.html("out"), Some("a"));
        assert!(guard.is_running());

        assert!(playback.advance(ms(100), &mut surface));
        assert_eq!(surface.html("out"), Some("abc"));
        assert!(!guard.is_running());
    }

    #[test]
    fn test_loader_delay_bounds() {
        let config = AnimationConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let delay = loader_delay(&mut rng, &config);
            assert!(delay >= ms(3000) && delay <= ms(5000));
        }
    }

    #[test]
    fn test_loader_delay_zero_without_animation() {
        let config = AnimationConfig {
            enabled: false,
            ..AnimationConfig::default()
        };
        assert!(loader_delay(&mut StdRng::seed_from_u64(7), &config).is_zero());
    }

    #[test]
    fn test_keyframe_serializes_millis() {
        let frame = Keyframe::html(ms(1500), "before-response", "x");
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["at_ms"], 1500);
        assert_eq!(json["update"]["kind"], "html");
        assert_eq!(json["update"]["value"], "x");
    }
}
