//! 進捗表示の状態
//!
//! - タイマーによる段階表示（プッシュが来るまでのフォールバック）
//! - プッシュイベントによる更新（最初のイベント以降はこちらが優先）

use crate::types::ProgressEvent;

/// タイマー表示の1段階
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressPhase {
    pub id: &'static str,
    pub duration_ms: u32,
    pub percent: u8,
    pub label: &'static str,
}

/// タイマー表示の段階一覧
pub const TIMED_PHASES: [ProgressPhase; 4] = [
    ProgressPhase {
        id: "step1",
        duration_ms: 2000,
        percent: 25,
        label: "Mengekstrak referensi dari dokumen...",
    },
    ProgressPhase {
        id: "step2",
        duration_ms: 3000,
        percent: 50,
        label: "Memisahkan entri referensi dengan AI...",
    },
    ProgressPhase {
        id: "step3",
        duration_ms: 5000,
        percent: 75,
        label: "Menganalisis setiap referensi...",
    },
    ProgressPhase {
        id: "step4",
        duration_ms: 2000,
        percent: 95,
        label: "Memvalidasi dengan database ScimagoJR...",
    },
];

pub const COMPLETE_LABEL: &str = "Proses selesai! Menampilkan hasil...";

/// 段階表示の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    Pending,
    Active,
    Completed,
}

impl PhaseState {
    pub fn class(&self) -> &'static str {
        match self {
            PhaseState::Pending => "",
            PhaseState::Active => "active",
            PhaseState::Completed => "completed",
        }
    }
}

/// 進捗の出どころ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProgressSource {
    #[default]
    Idle,
    Timed,
    Pushed,
    Finished,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressTracker {
    percent: u8,
    message: String,
    cached: bool,
    source: ProgressSource,
    /// 到達したタイマー段階（Noneは未開始）
    timed_phase: Option<usize>,
}

impl ProgressTracker {
    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// キャッシュ応答の見た目にするか
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    pub fn source(&self) -> ProgressSource {
        self.source
    }

    /// 新しい送信の開始
    pub fn start(&mut self) {
        *self = Self {
            source: ProgressSource::Timed,
            ..Self::default()
        };
    }

    /// タイマー段階を進める
    ///
    /// プッシュ受信後や終了後は無視し、falseを返す
    pub fn enter_timed_phase(&mut self, index: usize) -> bool {
        if self.source != ProgressSource::Timed {
            return false;
        }
        let Some(phase) = TIMED_PHASES.get(index) else {
            return false;
        };
        if self.timed_phase.is_some_and(|current| current >= index) {
            return false;
        }

        self.timed_phase = Some(index);
        self.percent = self.percent.max(phase.percent);
        self.message = phase.label.to_string();
        true
    }

    /// プッシュイベントを反映
    pub fn apply_event(&mut self, event: &ProgressEvent) -> bool {
        let percent = event.percent();
        match self.source {
            ProgressSource::Timed => {
                // 最初のプッシュはタイマー表示を置き換える
                self.percent = percent;
            }
            ProgressSource::Pushed => {
                self.percent = self.percent.max(percent);
            }
            ProgressSource::Idle | ProgressSource::Finished => return false,
        }

        self.source = ProgressSource::Pushed;
        if !event.message.is_empty() {
            self.message = event.message.clone();
        }
        self.cached = event.is_cache_hit();
        true
    }

    pub fn complete(&mut self) {
        self.percent = 100;
        self.message = COMPLETE_LABEL.to_string();
        self.source = ProgressSource::Finished;
        self.timed_phase = Some(TIMED_PHASES.len());
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 段階リストの表示状態
    pub fn phase_states(&self) -> Vec<(ProgressPhase, PhaseState)> {
        TIMED_PHASES
            .iter()
            .enumerate()
            .map(|(i, phase)| {
                let state = match self.timed_phase {
                    _ if self.source == ProgressSource::Finished => PhaseState::Completed,
                    Some(current) if i < current => PhaseState::Completed,
                    Some(current) if i == current => PhaseState::Active,
                    _ => PhaseState::Pending,
                };
                (*phase, state)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(progress: f64, message: &str) -> ProgressEvent {
        ProgressEvent {
            progress,
            message: message.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_timed_phases_advance() {
        let mut tracker = ProgressTracker::default();
        tracker.start();
        assert!(tracker.enter_timed_phase(0));
        assert_eq!(tracker.percent(), 25);
        assert!(tracker.enter_timed_phase(2));
        assert_eq!(tracker.percent(), 75);
        assert_eq!(tracker.message(), "Menganalisis setiap referensi...");

        // 逆戻りは無視
        assert!(!tracker.enter_timed_phase(1));
        assert!(!tracker.enter_timed_phase(9));
    }

    #[test]
    fn test_push_supersedes_timed() {
        let mut tracker = ProgressTracker::default();
        tracker.start();
        tracker.enter_timed_phase(2);

        assert!(tracker.apply_event(&event(30.0, "Menganalisis referensi 3/10")));
        assert_eq!(tracker.percent(), 30);
        assert_eq!(tracker.source(), ProgressSource::Pushed);

        assert!(!tracker.enter_timed_phase(3));
        assert_eq!(tracker.percent(), 30);
    }

    #[test]
    fn test_push_is_non_decreasing() {
        let mut tracker = ProgressTracker::default();
        tracker.start();
        tracker.apply_event(&event(60.0, "a"));
        tracker.apply_event(&event(40.0, "b"));
        assert_eq!(tracker.percent(), 60);
        assert_eq!(tracker.message(), "b");
    }

    #[test]
    fn test_events_ignored_when_idle_or_finished() {
        let mut tracker = ProgressTracker::default();
        assert!(!tracker.apply_event(&event(10.0, "stale")));
        assert_eq!(tracker.percent(), 0);

        tracker.start();
        tracker.complete();
        assert!(!tracker.apply_event(&event(10.0, "late")));
        assert_eq!(tracker.percent(), 100);
        assert_eq!(tracker.message(), COMPLETE_LABEL);
    }

    #[test]
    fn test_cached_treatment() {
        let mut tracker = ProgressTracker::default();
        tracker.start();
        tracker.apply_event(&ProgressEvent {
            progress: 90.0,
            message: "Hasil dari cache".into(),
            cached: Some(true),
            request_id: None,
        });
        assert!(tracker.is_cached());
    }

    #[test]
    fn test_reset_and_phase_states() {
        let mut tracker = ProgressTracker::default();
        tracker.start();
        tracker.enter_timed_phase(0);
        tracker.enter_timed_phase(1);
        let states: Vec<PhaseState> = tracker.phase_states().into_iter().map(|(_, s)| s).collect();
        assert_eq!(
            states,
            vec![PhaseState::Completed, PhaseState::Active, PhaseState::Pending, PhaseState::Pending]
        );

        tracker.complete();
        assert!(tracker.phase_states().iter().all(|(_, s)| *s == PhaseState::Completed));

        tracker.reset();
        assert_eq!(tracker.percent(), 0);
        assert!(tracker.message().is_empty());
        assert!(tracker.phase_states().iter().all(|(_, s)| *s == PhaseState::Pending));
    }
}
