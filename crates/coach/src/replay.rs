//! Landmark stream replay

use crate::CoachError;
use pose_frame::{FrameError, Landmark, LandmarkFrame};
use serde::{Deserialize, Serialize};
use session::{SessionController, SessionEvent, SessionSummary, TickOutput};
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// One line of a landmark stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamRecord {
    /// Capture time; synthesized from the tick rate when absent
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
    pub landmarks: Vec<Landmark>,
}

/// Replay settings
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Spacing for records without a timestamp
    pub tick_interval_ms: u64,
    /// Pace frames on a wall-clock interval instead of as fast as possible
    pub realtime: bool,
    /// Print every tick, not only ticks that emitted events
    pub verbose: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            tick_interval_ms: 33,
            realtime: false,
            verbose: false,
        }
    }
}

#[derive(Serialize)]
struct TickLine<'a> {
    timestamp_ms: u64,
    #[serde(flatten)]
    tick: &'a TickOutput,
}

/// Drives a session controller from a JSON-lines landmark stream,
/// writing ticks and session events as JSON lines
pub struct Replay<W: Write> {
    options: ReplayOptions,
    out: W,
    frames: u64,
    skipped: u64,
}

impl<W: Write> Replay<W> {
    pub fn new(options: ReplayOptions, out: W) -> Self {
        Self {
            options,
            out,
            frames: 0,
            skipped: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Start a session and feed it every record until the stream ends, the
    /// session completes, or `shutdown` resolves (which aborts the session)
    pub async fn run<R, S>(
        &mut self,
        controller: &mut SessionController,
        reader: R,
        shutdown: S,
    ) -> Result<SessionSummary, CoachError>
    where
        R: AsyncBufRead + Unpin,
        S: Future<Output = ()>,
    {
        let started = controller.start()?;
        self.emit_event(&started)?;

        let mut lines = reader.lines();
        let mut pacer = tokio::time::interval(Duration::from_millis(self.options.tick_interval_ms.max(1)));
        pacer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut line_no: u64 = 0;
        let mut last_ms: Option<u64> = None;
        while controller.is_active() {
            let line = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, aborting session");
                    break;
                }
                line = lines.next_line() => line?,
            };

            let Some(line) = line else {
                debug!("End of stream");
                break;
            };
            line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            let record = match parse_record(&line) {
                Ok(record) => record,
                Err(e) => {
                    warn!(line = line_no, "Skipping malformed frame: {}", e);
                    self.skipped += 1;
                    continue;
                }
            };

            if self.options.realtime {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        info!("Shutdown requested, aborting session");
                        break;
                    }
                    _ = pacer.tick() => {}
                }
            }

            // Unstamped records continue from the previous timestamp
            let now_ms = match record.timestamp_ms {
                Some(timestamp_ms) => timestamp_ms,
                None => last_ms.map_or(0, |t| t + self.options.tick_interval_ms),
            };
            last_ms = Some(now_ms);
            let frame = LandmarkFrame::new(record.landmarks);

            if let Some(tick) = controller.process(&frame, now_ms) {
                self.frames += 1;
                self.emit_tick(now_ms, &tick)?;
            }
        }

        if let Some(aborted) = controller.abort() {
            self.emit_event(&aborted)?;
        }
        let summary = controller.summary();

        info!(
            frames = self.frames,
            skipped = self.skipped,
            completed = summary.completed,
            "Replay finished"
        );
        self.out.flush()?;
        Ok(summary)
    }

    fn emit_tick(&mut self, timestamp_ms: u64, tick: &TickOutput) -> Result<(), CoachError> {
        let has_events = !tick.feedback.events.is_empty() || !tick.session_events.is_empty();
        if self.options.verbose || has_events {
            serde_json::to_writer(&mut self.out, &TickLine { timestamp_ms, tick })?;
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn emit_event(&mut self, event: &SessionEvent) -> Result<(), CoachError> {
        serde_json::to_writer(&mut self.out, event)?;
        writeln!(self.out)?;
        Ok(())
    }
}

fn parse_record(line: &str) -> Result<StreamRecord, CoachError> {
    let record: StreamRecord = serde_json::from_str(line).map_err(FrameError::from)?;
    // Reuse frame validation for size checks
    let frame = LandmarkFrame::new(record.landmarks).validated()?;
    Ok(StreamRecord {
        timestamp_ms: record.timestamp_ms,
        landmarks: frame.landmarks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibration::{Calibration, CalibrationStore, Phase};
    use evaluator::EvaluatorConfig;
    use feedback::FeedbackConfig;
    use pose_frame::BodyPart;
    use session::SessionConfig;

    fn stance_line(timestamp_ms: Option<u64>, visibility: f64) -> String {
        let mut frame = LandmarkFrame::empty();
        frame.set(BodyPart::LeftShoulder, Landmark::new(0.6, 0.3, 0.0, visibility));
        frame.set(BodyPart::RightShoulder, Landmark::new(0.4, 0.3, 0.0, visibility));
        frame.set(BodyPart::LeftAnkle, Landmark::new(0.65, 0.9, 0.0, visibility));
        frame.set(BodyPart::RightAnkle, Landmark::new(0.35, 0.9, 0.0, visibility));
        serde_json::to_string(&StreamRecord {
            timestamp_ms,
            landmarks: frame.landmarks,
        })
        .unwrap()
    }

    fn front_only_controller(max_reps: u32) -> SessionController {
        let mut store = CalibrationStore::new();
        store.set(Phase::Front, Calibration::Stance { stance_ratio: 1.5 });
        SessionController::new(
            SessionConfig {
                max_reps,
                phases: vec![Phase::Front],
            },
            EvaluatorConfig::default(),
            FeedbackConfig::default(),
            store,
        )
    }

    fn lines_of(output: Vec<u8>) -> Vec<serde_json::Value> {
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_replay_completes_session() {
        let stream: String = (0..20)
            .map(|i| stance_line(None, 0.9) + if i % 7 == 3 { "\n\n" } else { "\n" })
            .collect();

        let mut controller = front_only_controller(1);
        let mut replay = Replay::new(ReplayOptions::default(), Vec::new());
        let summary = replay
            .run(&mut controller, stream.as_bytes(), std::future::pending())
            .await
            .unwrap();

        assert!(summary.completed);
        assert_eq!(summary.total_successes, 1);
        // Success lands on the first synthesized timestamp >= 300 ms (10 * 33)
        assert_eq!(replay.frames(), 11);

        let lines = lines_of(replay.into_inner());
        assert_eq!(lines[0]["kind"], "started");
        let last = lines.last().unwrap();
        assert_eq!(last["timestamp_ms"], 330);
        assert_eq!(last["session_events"][1]["kind"], "completed");
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped() {
        let stream = format!(
            "{}\nnot json\n{{\"landmarks\": 7}}\n{}\n",
            stance_line(Some(0), 0.2),
            stance_line(Some(40), 0.2)
        );

        let mut controller = front_only_controller(5);
        let mut replay = Replay::new(ReplayOptions::default(), Vec::new());
        let summary = replay
            .run(&mut controller, stream.as_bytes(), std::future::pending())
            .await
            .unwrap();

        assert_eq!(replay.frames(), 2);
        assert_eq!(replay.skipped(), 2);
        assert!(!summary.completed);

        let lines = lines_of(replay.into_inner());
        // started, searching announced once, aborted at end of stream
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1]["feedback"]["events"][0]["kind"], "searching");
        assert_eq!(lines[2]["kind"], "aborted");
    }

    #[tokio::test]
    async fn test_shutdown_aborts() {
        let stream = stance_line(Some(0), 0.9) + "\n";
        let mut controller = front_only_controller(5);
        let mut replay = Replay::new(ReplayOptions::default(), Vec::new());

        let summary = replay
            .run(&mut controller, stream.as_bytes(), async {})
            .await
            .unwrap();

        assert!(!summary.completed);
        assert!(!controller.is_active());
        assert_eq!(replay.frames(), 0);
    }

    #[tokio::test]
    async fn test_unstamped_records_continue_from_last_timestamp() {
        let mut stream = stance_line(Some(10_000), 0.9) + "\n";
        for _ in 0..30 {
            stream += &(stance_line(None, 0.9) + "\n");
        }

        let mut controller = front_only_controller(1);
        let mut replay = Replay::new(ReplayOptions::default(), Vec::new());
        let summary = replay
            .run(&mut controller, stream.as_bytes(), std::future::pending())
            .await
            .unwrap();

        assert!(summary.completed);
        assert_eq!(summary.total_successes, 1);
        assert_eq!(replay.frames(), 11);

        let lines = lines_of(replay.into_inner());
        let last = lines.last().unwrap();
        assert_eq!(last["timestamp_ms"], 10_330);
        assert_eq!(last["session_events"][0]["kind"], "rep_completed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_pacing() {
        let stream: String = (0..5).map(|_| stance_line(None, 0.9) + "\n").collect();
        let mut controller = front_only_controller(5);
        let options = ReplayOptions {
            realtime: true,
            ..Default::default()
        };
        let mut replay = Replay::new(options, Vec::new());

        let started = tokio::time::Instant::now();
        let shutdown = tokio::time::sleep(Duration::from_millis(50));
        let summary = replay
            .run(&mut controller, stream.as_bytes(), shutdown)
            .await
            .unwrap();

        // Frames at 0 and 33 ms; the wait for the 66 ms tick is cut short
        assert_eq!(replay.frames(), 2);
        assert!(started.elapsed() < Duration::from_millis(66));
        assert!(!summary.completed);

        let lines = lines_of(replay.into_inner());
        assert_eq!(lines.last().unwrap()["kind"], "aborted");
    }

    #[tokio::test(start_paused = true)]
    async fn test_realtime_pacing() {
        let stream: String = (0..3u64).map(|i| stance_line(Some(i * 33), 0.9) + "\n").collect();
        let mut controller = front_only_controller(5);
        let options = ReplayOptions {
            realtime: true,
            verbose: true,
            ..Default::default()
        };
        let mut replay = Replay::new(options, Vec::new());

        let started = tokio::time::Instant::now();
        replay
            .run(&mut controller, stream.as_bytes(), std::future::pending())
            .await
            .unwrap();

        // First tick is immediate, then one interval per frame
        assert!(started.elapsed() >= Duration::from_millis(66));
        assert_eq!(replay.frames(), 3);
    }
}
