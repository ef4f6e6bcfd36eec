use super::{ActivityTracker, EndReason, EventKind, EventMeta, MarkState, Timer, TotemState};
use crate::combat::{ActionKind, Modifier, Multiplier};
use crate::config::{EventConfig, GameConfig};
use crate::env::RngSource;
use crate::error::ActionError;
use crate::notice::SessionEvent;
use crate::state::{UNKNOWN_USER, normalize_username};

/// Events only run from this phase on.
pub const FIRST_EVENT_PHASE: u32 = 2;

/// How many known players the mark fallback asks the store for.
pub const MARK_FALLBACK_LIMIT: usize = 500;

/// The single running modifier.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEvent {
    pub kind: EventKind,
    pub started_at_ms: u64,
    pub duration_ms: u64,
    pub timer: Timer,
    pub meta: EventMeta,
}

impl ActiveEvent {
    pub fn mark(&self) -> Option<&MarkState> {
        match &self.meta {
            EventMeta::Mark(mark) => Some(mark),
            _ => None,
        }
    }

    pub fn totem(&self) -> Option<&TotemState> {
        match &self.meta {
            EventMeta::Totem(totem) => Some(totem),
            _ => None,
        }
    }
}

/// Mark charge update caused by one offensive hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkProgress {
    pub marked_user: String,
    pub charges: u32,
    pub charge_target: u32,
    pub broken: bool,
    /// This hit is the one that broke the mark.
    pub broken_now: bool,
    /// One-time bonus granted by this hit, zero otherwise.
    pub bonus_xp: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TotemHit {
    pub dealt: u32,
    pub hp: u32,
    pub hp_max: u32,
    pub destroyed: bool,
}

/// Scheduler and owner of the active event.
///
/// Cycles Idle -> Scheduled -> Active forever while the boss is in phase 2 or
/// later and the stream is live. Going offline freezes both the active event
/// timer and the schedule; coming back restores them with the same remaining
/// time.
#[derive(Clone, Debug)]
pub struct EventEngine<R> {
    config: EventConfig,
    rng: R,
    stream_live: bool,
    active: Option<ActiveEvent>,
    schedule: Option<Timer>,
    last_kind: Option<EventKind>,
    activity: ActivityTracker,
}

impl<R: RngSource> EventEngine<R> {
    pub fn new(config: EventConfig, rng: R) -> Self {
        Self {
            stream_live: config.stream_live_default,
            config,
            rng,
            active: None,
            schedule: None,
            last_kind: None,
            activity: ActivityTracker::new(),
        }
    }

    pub fn config(&self) -> &EventConfig {
        &self.config
    }

    pub fn is_stream_live(&self) -> bool {
        self.stream_live
    }

    pub fn active(&self) -> Option<&ActiveEvent> {
        self.active.as_ref()
    }

    /// Pending start of the next event, running or frozen.
    pub fn schedule(&self) -> Option<Timer> {
        self.schedule
    }

    pub fn last_kind(&self) -> Option<EventKind> {
        self.last_kind
    }

    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn touch_activity(&mut self, user: &str, now_ms: u64) {
        self.activity
            .touch(user, now_ms, self.config.mark_active_window_ms);
    }

    // ========================================================================
    // Scheduler
    // ========================================================================

    /// Advances the scheduler to `now_ms`.
    ///
    /// `known_players` is only called when a mark event starts and nobody has
    /// been active recently.
    pub fn tick<F>(
        &mut self,
        now_ms: u64,
        phase: u32,
        known_players: F,
        out: &mut Vec<SessionEvent>,
    ) where
        F: FnOnce() -> Vec<String>,
    {
        self.activity
            .prune(now_ms, self.config.mark_active_window_ms);

        if phase < FIRST_EVENT_PHASE {
            if self.active.is_some() {
                self.end_active(EndReason::PhaseBelow2, now_ms, phase, out);
            } else {
                self.schedule = None;
            }
            return;
        }

        if !self.stream_live {
            return;
        }

        if let Some(expired) = self.active.as_ref().map(|e| e.timer.is_expired(now_ms)) {
            if expired {
                self.end_active(EndReason::Timeout, now_ms, phase, out);
            }
            return;
        }

        match self.schedule {
            None => self.schedule_next(now_ms, phase, out),
            Some(timer) if timer.is_expired(now_ms) => {
                let kind = self.pick_next_kind();
                self.begin(kind, now_ms, phase, known_players, out);
            }
            Some(_) => {}
        }
    }

    /// Toggles stream liveness. Returns false when nothing changed.
    pub fn set_stream_live(
        &mut self,
        live: bool,
        now_ms: u64,
        phase: u32,
        out: &mut Vec<SessionEvent>,
    ) -> bool {
        if self.stream_live == live {
            return false;
        }
        self.stream_live = live;

        if !live {
            if let Some(active) = &mut self.active {
                active.timer = active.timer.paused(now_ms);
            }
            self.schedule = self.schedule.map(|timer| timer.paused(now_ms));
            out.push(SessionEvent::StreamChanged { live: false });
            return true;
        }

        let mut expired = false;
        if let Some(active) = &mut self.active {
            expired = active.timer.remaining_ms(now_ms) == 0;
            active.timer = active.timer.resumed(now_ms);
        }
        if expired {
            self.end_active(EndReason::ResumeExpired, now_ms, phase, out);
        }

        if self.active.is_none() {
            match self.schedule {
                Some(timer) => self.schedule = Some(timer.resumed(now_ms)),
                None if phase >= FIRST_EVENT_PHASE => self.schedule_next(now_ms, phase, out),
                None => {}
            }
        }

        out.push(SessionEvent::StreamChanged { live: true });
        true
    }

    /// Starts `kind` right away. Returns false if another event is running or
    /// events are not allowed at the moment.
    pub fn start_event<F>(
        &mut self,
        kind: EventKind,
        now_ms: u64,
        phase: u32,
        known_players: F,
        out: &mut Vec<SessionEvent>,
    ) -> bool
    where
        F: FnOnce() -> Vec<String>,
    {
        if self.active.is_some() || !self.stream_live || phase < FIRST_EVENT_PHASE {
            return false;
        }
        self.begin(kind, now_ms, phase, known_players, out);
        true
    }

    fn schedule_next(&mut self, now_ms: u64, phase: u32, out: &mut Vec<SessionEvent>) {
        if !self.stream_live || self.active.is_some() || phase < FIRST_EVENT_PHASE {
            self.schedule = None;
            return;
        }
        let in_ms = self
            .rng
            .range(self.config.break_min_ms, self.config.break_max_ms);
        let timer = Timer::starting(now_ms, in_ms);
        self.schedule = Some(timer);
        out.push(SessionEvent::EventScheduled {
            at_ms: now_ms.saturating_add(in_ms),
            in_ms,
        });
    }

    fn pick_next_kind(&mut self) -> EventKind {
        let candidates: Vec<EventKind> = EventKind::ALL
            .into_iter()
            .filter(|kind| Some(*kind) != self.last_kind)
            .collect();
        self.rng
            .pick_index(candidates.len())
            .map_or(EventKind::Shield, |index| candidates[index])
    }

    fn begin<F>(
        &mut self,
        kind: EventKind,
        now_ms: u64,
        phase: u32,
        known_players: F,
        out: &mut Vec<SessionEvent>,
    ) where
        F: FnOnce() -> Vec<String>,
    {
        let duration_ms = if kind.has_fixed_duration() {
            self.config.fixed_duration_ms
        } else {
            self.rng
                .range(self.config.min_duration_ms, self.config.max_duration_ms)
        };
        let meta = match kind {
            EventKind::Mark => EventMeta::Mark(MarkState {
                marked_user: self.pick_marked_user(known_players),
                charges: 0,
                charge_target: self.config.mark_charge_target,
                broken: false,
                bonus_granted: false,
            }),
            EventKind::Totem => {
                let hp = self.totem_hp_for(phase);
                EventMeta::Totem(TotemState {
                    hp,
                    hp_max: hp,
                    destroyed: false,
                })
            }
            _ => EventMeta::Plain,
        };

        self.active = Some(ActiveEvent {
            kind,
            started_at_ms: now_ms,
            duration_ms,
            timer: Timer::starting(now_ms, duration_ms),
            meta,
        });
        self.last_kind = Some(kind);
        self.schedule = None;
        out.push(SessionEvent::EventStarted { kind, duration_ms });
    }

    fn end_active(
        &mut self,
        reason: EndReason,
        now_ms: u64,
        phase: u32,
        out: &mut Vec<SessionEvent>,
    ) {
        let Some(ended) = self.active.take() else {
            return;
        };
        out.push(SessionEvent::EventEnded {
            kind: ended.kind,
            reason,
        });
        if self.stream_live && phase >= FIRST_EVENT_PHASE {
            self.schedule_next(now_ms, phase, out);
        } else {
            self.schedule = None;
        }
    }

    fn pick_marked_user<F>(&mut self, known_players: F) -> String
    where
        F: FnOnce() -> Vec<String>,
    {
        let active = self.activity.candidates();
        if let Some(index) = self.rng.pick_index(active.len()) {
            return active[index].to_owned();
        }

        let fallback: Vec<String> = known_players()
            .iter()
            .map(|name| normalize_username(name))
            .filter(|name| name != UNKNOWN_USER)
            .collect();
        match self.rng.pick_index(fallback.len()) {
            Some(index) => fallback[index].clone(),
            None => UNKNOWN_USER.to_owned(),
        }
    }

    fn totem_hp_for(&self, phase: u32) -> u32 {
        self.config
            .totem_base_hp
            .saturating_add(phase.max(1).saturating_mul(self.config.totem_hp_per_phase))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    fn active_kind(&self) -> Option<EventKind> {
        self.active.as_ref().map(|event| event.kind)
    }

    pub fn is_silence_active(&self) -> bool {
        self.active_kind() == Some(EventKind::Silence)
    }

    pub fn is_roleswap_active(&self) -> bool {
        self.active_kind() == Some(EventKind::Roleswap)
    }

    /// A totem event is running and the totem still has HP.
    pub fn is_totem_active(&self) -> bool {
        self.active
            .as_ref()
            .and_then(ActiveEvent::totem)
            .is_some_and(TotemState::is_standing)
    }

    fn is_exhausted(&self, action: ActionKind, last_offensive_ms: u64, now_ms: u64) -> bool {
        self.active_kind() == Some(EventKind::Exhaust)
            && action.is_offensive()
            && last_offensive_ms > 0
            && now_ms.saturating_sub(last_offensive_ms) < self.config.exhaust_window_ms
    }

    /// Factor applied to boss damage dealt by `action`.
    ///
    /// `last_offensive_ms` is the actor's previous offensive timestamp, read
    /// before this action updates it.
    pub fn boss_damage_multiplier(
        &self,
        action: ActionKind,
        last_offensive_ms: u64,
        now_ms: u64,
    ) -> Multiplier {
        let mut mult = Multiplier::identity();
        let Some(active) = &self.active else {
            return mult;
        };
        match &active.meta {
            EventMeta::Mark(mark) if mark.broken => {
                mult.apply(Modifier::Vulnerable, self.config.vulnerable_damage_mult);
            }
            EventMeta::Totem(totem) if totem.is_standing() => {
                mult.apply(Modifier::Totem, self.config.totem_boss_reduction);
            }
            _ => {}
        }
        if active.kind == EventKind::Shield {
            mult.apply(Modifier::Shield, self.config.shield_damage_mult);
        }
        if self.is_exhausted(action, last_offensive_ms, now_ms) {
            mult.apply(Modifier::Exhausted, self.config.exhausted_damage_mult);
        }
        mult
    }

    /// Factor applied to XP earned by `action`.
    pub fn xp_multiplier(
        &self,
        action: ActionKind,
        last_offensive_ms: u64,
        now_ms: u64,
    ) -> Multiplier {
        let mut mult = Multiplier::identity();
        if self.is_exhausted(action, last_offensive_ms, now_ms) {
            mult.apply(Modifier::Exhausted, self.config.exhausted_xp_mult);
        }
        mult
    }

    // ========================================================================
    // Hit interactions
    // ========================================================================

    /// Counts an offensive hit by the marked user toward breaking the mark.
    ///
    /// The bonus is granted once per mark; further hits after the break only
    /// report progress.
    pub fn on_boss_hit(&mut self, user: &str, action: ActionKind) -> Option<MarkProgress> {
        if !action.is_offensive() {
            return None;
        }
        let hitter = normalize_username(user);
        let bonus = self.config.mark_bonus_xp;
        let mark = match self.active.as_mut().map(|event| &mut event.meta) {
            Some(EventMeta::Mark(mark)) => mark,
            _ => return None,
        };
        if hitter != mark.marked_user {
            return None;
        }

        let target = mark.charge_target.max(1);
        mark.charges = mark.charges.saturating_add(1).min(target);

        let mut broken_now = false;
        let mut bonus_xp = 0;
        if !mark.broken && mark.charges >= target {
            mark.broken = true;
            broken_now = true;
            if !mark.bonus_granted {
                mark.bonus_granted = true;
                bonus_xp = bonus;
            }
        }

        Some(MarkProgress {
            marked_user: mark.marked_user.clone(),
            charges: mark.charges,
            charge_target: target,
            broken: mark.broken,
            broken_now,
            bonus_xp,
        })
    }

    /// Damages the totem. Destroying it ends the event without an announcement.
    pub fn damage_totem(
        &mut self,
        amount: u32,
        now_ms: u64,
        phase: u32,
        out: &mut Vec<SessionEvent>,
    ) -> Result<TotemHit, ActionError> {
        let dealt = amount.min(GameConfig::MAX_HIT_AMOUNT);
        let totem = match self.active.as_mut().map(|event| &mut event.meta) {
            Some(EventMeta::Totem(totem)) if totem.is_standing() => totem,
            _ => return Err(ActionError::TotemInactive),
        };
        if dealt == 0 {
            return Err(ActionError::InvalidAmount(0));
        }

        totem.hp = totem.hp.saturating_sub(dealt);
        totem.hp_max = totem.hp_max.max(totem.hp);
        totem.destroyed = totem.hp == 0;
        let hit = TotemHit {
            dealt,
            hp: totem.hp,
            hp_max: totem.hp_max,
            destroyed: totem.destroyed,
        };

        if hit.destroyed {
            self.end_active(EndReason::TotemDestroyed, now_ms, phase, out);
        }
        Ok(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::SequenceRng;

    fn engine(values: &[u32]) -> EventEngine<SequenceRng> {
        EventEngine::new(EventConfig::default(), SequenceRng::new(values.to_vec()))
    }

    fn nobody() -> Vec<String> {
        Vec::new()
    }

    /// Schedules at t=0 and starts the first event at t=30s.
    fn started(values: &[u32]) -> (EventEngine<SequenceRng>, Vec<SessionEvent>) {
        let mut engine = engine(values);
        let mut out = Vec::new();
        engine.tick(0, 2, nobody, &mut out);
        engine.tick(30_000, 2, nobody, &mut out);
        (engine, out)
    }

    #[test]
    fn no_events_below_phase_two() {
        let mut engine = engine(&[0]);
        let mut out = Vec::new();
        for second in 0..1_000 {
            engine.tick(second * 1_000, 1, nobody, &mut out);
        }
        assert!(engine.active().is_none());
        assert!(engine.schedule().is_none());
        assert!(out.is_empty());
    }

    #[test]
    fn schedules_then_starts_shield() {
        let (engine, out) = started(&[0]);

        let active = engine.active().expect("event should be running");
        assert_eq!(active.kind, EventKind::Shield);
        assert_eq!(active.duration_ms, 300_000);
        assert_eq!(active.timer.ends_at_ms(), Some(330_000));
        assert_eq!(
            out,
            vec![
                SessionEvent::EventScheduled {
                    at_ms: 30_000,
                    in_ms: 30_000
                },
                SessionEvent::EventStarted {
                    kind: EventKind::Shield,
                    duration_ms: 300_000
                },
            ]
        );
    }

    #[test]
    fn timeout_ends_and_reschedules() {
        let (mut engine, _) = started(&[0]);
        let mut out = Vec::new();
        engine.tick(329_999, 2, nobody, &mut out);
        assert!(engine.active().is_some());

        engine.tick(330_000, 2, nobody, &mut out);
        assert!(engine.active().is_none());
        assert_eq!(
            out[0],
            SessionEvent::EventEnded {
                kind: EventKind::Shield,
                reason: EndReason::Timeout
            }
        );
        assert_eq!(engine.schedule().and_then(|t| t.ends_at_ms()), Some(360_000));
    }

    #[test]
    fn next_event_never_repeats_previous() {
        let (mut engine, _) = started(&[0]);
        let mut out = Vec::new();
        engine.tick(330_000, 2, nobody, &mut out);
        engine.tick(360_000, 2, nobody, &mut out);
        assert_eq!(engine.active().map(|e| e.kind), Some(EventKind::Silence));
    }

    #[test]
    fn offline_freezes_remaining_time() {
        let (mut engine, _) = started(&[0]);
        let mut out = Vec::new();

        assert!(engine.set_stream_live(false, 100_000, 2, &mut out));
        assert_eq!(
            engine.active().map(|e| e.timer),
            Some(Timer::Paused {
                remaining_ms: 230_000
            })
        );
        // Ticks while offline do nothing.
        engine.tick(10_000_000, 2, nobody, &mut out);
        assert!(engine.active().is_some());

        assert!(engine.set_stream_live(true, 500_000, 2, &mut out));
        assert_eq!(engine.active().and_then(|e| e.timer.ends_at_ms()), Some(730_000));
        engine.tick(729_999, 2, nobody, &mut out);
        assert!(engine.active().is_some());
        engine.tick(730_000, 2, nobody, &mut out);
        assert!(engine.active().is_none());
    }

    #[test]
    fn resume_after_deadline_ends_silently() {
        let (mut engine, _) = started(&[0]);
        let mut out = Vec::new();
        engine.set_stream_live(false, 330_000, 2, &mut out);
        out.clear();

        engine.set_stream_live(true, 400_000, 2, &mut out);
        assert!(engine.active().is_none());
        assert_eq!(
            out[0],
            SessionEvent::EventEnded {
                kind: EventKind::Shield,
                reason: EndReason::ResumeExpired
            }
        );
        assert!(engine.schedule().is_some());
        assert_eq!(out.last(), Some(&SessionEvent::StreamChanged { live: true }));
    }

    #[test]
    fn offline_schedule_is_restored() {
        let mut engine = engine(&[0]);
        let mut out = Vec::new();
        engine.tick(0, 2, nobody, &mut out);
        engine.set_stream_live(false, 10_000, 2, &mut out);
        assert_eq!(engine.schedule(), Some(Timer::Paused { remaining_ms: 20_000 }));

        engine.set_stream_live(true, 100_000, 2, &mut out);
        assert_eq!(engine.schedule().and_then(|t| t.ends_at_ms()), Some(120_000));
        assert!(!engine.set_stream_live(true, 100_000, 2, &mut out));
    }

    #[test]
    fn offline_stream_never_starts_events() {
        let mut engine = engine(&[0]);
        let mut out = Vec::new();
        engine.set_stream_live(false, 0, 2, &mut out);
        for second in 0..600 {
            engine.tick(second * 1_000, 2, nobody, &mut out);
        }
        assert!(engine.active().is_none());
        assert!(!engine.start_event(EventKind::Mark, 0, 2, nobody, &mut out));
    }

    #[test]
    fn phase_drop_ends_active_event() {
        let (mut engine, _) = started(&[0]);
        let mut out = Vec::new();
        engine.tick(31_000, 1, nobody, &mut out);
        assert!(engine.active().is_none());
        assert!(engine.schedule().is_none());
        assert_eq!(
            out,
            vec![SessionEvent::EventEnded {
                kind: EventKind::Shield,
                reason: EndReason::PhaseBelow2
            }]
        );
    }

    #[test]
    fn mark_prefers_recently_active_users() {
        let mut engine = engine(&[0]);
        let mut out = Vec::new();
        engine.touch_activity("carol", 0);
        engine.touch_activity("alice", 0);
        assert!(engine.start_event(EventKind::Mark, 1_000, 2, nobody, &mut out));
        let mark = engine.active().and_then(ActiveEvent::mark).cloned();
        assert_eq!(mark.map(|m| m.marked_user), Some("alice".to_owned()));
    }

    #[test]
    fn mark_falls_back_to_known_players() {
        let mut engine = engine(&[1]);
        let mut out = Vec::new();
        let known = || vec!["unknown".to_owned(), "dave".to_owned(), " erin ".to_owned()];
        engine.start_event(EventKind::Mark, 0, 2, known, &mut out);
        let mark = engine.active().and_then(ActiveEvent::mark);
        assert_eq!(mark.map(|m| m.marked_user.as_str()), Some("erin"));
    }

    #[test]
    fn mark_breaks_once() {
        let mut engine = engine(&[0]);
        let mut out = Vec::new();
        engine.touch_activity("alice", 0);
        engine.start_event(EventKind::Mark, 0, 2, nobody, &mut out);

        assert_eq!(engine.on_boss_hit("bob", ActionKind::Attack), None);
        assert_eq!(engine.on_boss_hit("alice", ActionKind::Heal), None);

        let first = engine.on_boss_hit("alice", ActionKind::Attack);
        assert_eq!(first.map(|p| p.charges), Some(1));
        engine.on_boss_hit("alice", ActionKind::Ue);
        let third = engine.on_boss_hit("alice", ActionKind::Attack).expect("progress");
        assert!(third.broken_now);
        assert_eq!(third.bonus_xp, 100);

        let fourth = engine.on_boss_hit("alice", ActionKind::Attack).expect("progress");
        assert_eq!(fourth.charges, 3);
        assert!(fourth.broken);
        assert!(!fourth.broken_now);
        assert_eq!(fourth.bonus_xp, 0);
    }

    #[test]
    fn totem_destruction_ends_event() {
        let mut engine = engine(&[0]);
        let mut out = Vec::new();
        engine.start_event(EventKind::Totem, 0, 2, nobody, &mut out);
        // 120 + 2 * 40
        assert_eq!(engine.active().and_then(ActiveEvent::totem).map(|t| t.hp), Some(200));
        assert!(engine.is_totem_active());

        let hit = engine.damage_totem(150, 1_000, 2, &mut out).expect("hit");
        assert_eq!(hit.hp, 50);
        assert!(!hit.destroyed);

        out.clear();
        let hit = engine.damage_totem(999, 2_000, 2, &mut out).expect("hit");
        assert!(hit.destroyed);
        assert!(engine.active().is_none());
        assert_eq!(
            out[0],
            SessionEvent::EventEnded {
                kind: EventKind::Totem,
                reason: EndReason::TotemDestroyed
            }
        );
        assert_eq!(
            engine.damage_totem(5, 3_000, 2, &mut out),
            Err(ActionError::TotemInactive)
        );
    }

    #[test]
    fn multipliers_compose_per_event() {
        let mut engine = engine(&[0]);
        let mut out = Vec::new();
        assert!(engine.boss_damage_multiplier(ActionKind::Attack, 0, 0).is_identity());

        engine.start_event(EventKind::Shield, 0, 2, nobody, &mut out);
        let mult = engine.boss_damage_multiplier(ActionKind::Attack, 0, 0);
        assert_eq!(mult.value(), 0.2);
        assert_eq!(mult.applied(), &[(Modifier::Shield, 0.2)]);
    }

    #[test]
    fn exhaust_hits_only_recent_offense() {
        let mut engine = engine(&[0]);
        let mut out = Vec::new();
        engine.start_event(EventKind::Exhaust, 0, 2, nobody, &mut out);

        let now = 200_000;
        let recent = now - 10_000;
        assert_eq!(engine.boss_damage_multiplier(ActionKind::Attack, recent, now).value(), 0.5);
        assert_eq!(engine.xp_multiplier(ActionKind::Ue, recent, now).value(), 0.5);
        assert!(engine.boss_damage_multiplier(ActionKind::Heal, recent, now).is_identity());
        assert!(engine.boss_damage_multiplier(ActionKind::Attack, 0, now).is_identity());
        assert!(
            engine
                .boss_damage_multiplier(ActionKind::Attack, now - 180_000, now)
                .is_identity()
        );
    }
}
