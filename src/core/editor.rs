//! Timeline editor: the headless core behind the timeline widget.
//!
//! # Purpose
//!
//! Owns everything one open story timeline needs between frames: the clip
//! replica, zoom, the gesture state machine, the player, the mutation
//! dispatcher, toasts and the viewport scroll. The widget feeds it pointer
//! and keyboard input in content-space coordinates and paints `layouts()`.
//!
//! # Data flow
//!
//! ```text
//! pointer_* / execute ──▶ Interaction ──Commit──▶ Mutation ──▶ dispatcher
//!                                                                  │
//! tick(now) ◀── DispatchEvent (ClipsReplaced / Failed) ◀───────────┘
//! ```
//!
//! The replica is never edited locally. Gestures show provisional values
//! through the layout engine until the backend's refetch replaces the clips.

use log::{debug, info, warn};
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::context::EditorContext;
use super::coords::{Point, TimeScale};
use super::interaction::{Commit, Interaction, TRACK_HEIGHT, TrimSide};
use super::keymap::{EditorCommand, KeyMap};
use super::layout::{ClipHit, ClipLayout, HitZone, TRIM_HANDLE_PX, hit_test, layout_clips, timeline_extent};
use super::notify::{Notification, Notifications};
use super::player::{Player, follow_playhead};
use crate::backend::{DispatchEvent, MoveBody, Mutation, MutationDispatcher, SplitBody, TrimBody};
use crate::config::EditorSettings;
use crate::entities::{Clip, total_duration_ms, track_set};
use crate::error::EditError;

pub struct TimelineEditor {
    story_id: String,
    clips: Vec<Clip>,
    tracks: Vec<i32>,
    scale: TimeScale,
    interaction: Interaction,
    ctx: EditorContext,
    player: Player,
    dispatcher: MutationDispatcher,
    notifications: Notifications,
    keymap: KeyMap,
    scroll_left: f64,
    viewport_width: f64,
    panel_height: f64,
    loaded: bool,
}

impl TimelineEditor {
    pub fn new(
        story_id: impl Into<String>,
        player: Player,
        dispatcher: MutationDispatcher,
        settings: &EditorSettings,
    ) -> Self {
        let ctx = player.context().clone();
        Self {
            story_id: story_id.into(),
            clips: Vec::new(),
            tracks: track_set(&[]),
            scale: TimeScale::new(settings.pixels_per_second),
            interaction: Interaction::Idle,
            ctx,
            player,
            dispatcher,
            notifications: Notifications::new(Duration::from_secs(settings.notification_secs)),
            keymap: KeyMap::default(),
            scroll_left: 0.0,
            viewport_width: 0.0,
            panel_height: settings.timeline_height,
            loaded: false,
        }
    }

    // === Accessors ===

    pub fn story_id(&self) -> &str {
        &self.story_id
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn clip(&self, clip_id: &str) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    pub fn tracks(&self) -> &[i32] {
        &self.tracks
    }

    pub fn scale(&self) -> &TimeScale {
        &self.scale
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn context(&self) -> &EditorContext {
        &self.ctx
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn keymap_mut(&mut self) -> &mut KeyMap {
        &mut self.keymap
    }

    /// True once the first clip list arrived from the backend.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn requests_in_flight(&self) -> usize {
        self.dispatcher.in_flight()
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn dismiss_notification(&mut self, id: Uuid) {
        self.notifications.dismiss(id);
    }

    pub fn panel_height(&self) -> f64 {
        self.panel_height
    }

    /// Panel height including an in-progress resize.
    pub fn live_panel_height(&self) -> f64 {
        match &self.interaction {
            Interaction::ResizingPanel(resize) => resize.height,
            _ => self.panel_height,
        }
    }

    pub fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    /// Playhead of this story (0 when another story owns playback).
    pub fn playhead_ms(&self) -> i64 {
        self.ctx.playhead_for(&self.story_id)
    }

    pub fn playhead_px(&self) -> f64 {
        self.scale.ms_to_px(self.playhead_ms() as f64)
    }

    pub fn is_playing(&self) -> bool {
        let playback = self.ctx.playback();
        playback.is_playing && playback.playback_story_id.as_deref() == Some(self.story_id.as_str())
    }

    /// Clips under the playhead while this story is playing.
    pub fn audible_clips(&self) -> Vec<&Clip> {
        if !self.is_playing() {
            return Vec::new();
        }
        self.player
            .schedule()
            .active_at(self.playhead_ms())
            .filter_map(|entry| self.clip(&entry.clip_id))
            .collect()
    }

    pub fn layouts(&self) -> Vec<ClipLayout> {
        layout_clips(&self.clips, &self.tracks, &self.scale, &self.interaction)
    }

    /// Rendered timeline length in ms.
    pub fn total_ms(&self) -> i64 {
        total_duration_ms(&self.clips)
    }

    /// Clip and zone under a content-space point.
    pub fn hit_at(&self, point: Point) -> Option<ClipHit> {
        hit_test(&self.layouts(), point, TRIM_HANDLE_PX)
    }

    /// Content size (width, height) in pixels.
    pub fn extent(&self) -> (f64, f64) {
        timeline_extent(&self.clips, &self.tracks, &self.scale)
    }

    /// Audio asset of a clip's generation.
    pub fn audio_url(&self, clip_id: &str) -> Option<String> {
        self.clip(clip_id)
            .map(|clip| self.dispatcher.backend().audio_url(&clip.generation_id))
    }

    // === Replica ===

    /// Ask the backend for the current clip list.
    pub fn refresh(&mut self) {
        let story_id = self.story_id.clone();
        self.dispatcher.request_refetch(&story_id);
    }

    /// Replace the replica with an authoritative clip list.
    pub fn set_clips(&mut self, clips: Vec<Clip>, now: Instant) {
        let (clips, rejected): (Vec<Clip>, Vec<Clip>) = clips.into_iter().partition(Clip::is_well_formed);
        for clip in &rejected {
            warn!("ignoring malformed clip {}: {:?}", clip.id, clip);
        }
        self.clips = clips;
        self.tracks = track_set(&self.clips);
        self.loaded = true;

        if let Some(selected) = self.ctx.selected_clip() {
            if self.clip(&selected).is_none() {
                debug!("selected clip {} is gone", selected);
                self.ctx.clear_selection();
            }
        }
        if let Some(active) = self.interaction.active_clip_id() {
            if self.clip(active).is_none() {
                debug!("clip {} vanished mid-gesture", active);
                self.interaction.cancel();
            }
        }
        self.player.refresh(&self.story_id, &self.clips, now);
        self.clamp_scroll();
        debug!("replica: {} clips on {} tracks", self.clips.len(), self.tracks.len());
    }

    // === Selection ===

    pub fn selected_clip(&self) -> Option<String> {
        self.ctx.selected_clip()
    }

    pub fn select_clip(&mut self, clip_id: &str) -> Result<(), EditError> {
        if self.clip(clip_id).is_none() {
            return Err(EditError::UnknownClip(clip_id.to_string()));
        }
        self.ctx.select(clip_id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.ctx.clear_selection();
    }

    fn selected(&self) -> Result<Clip, EditError> {
        let id = self.ctx.selected_clip().ok_or(EditError::NoSelection)?;
        self.clip(&id).cloned().ok_or(EditError::UnknownClip(id))
    }

    // === Pointer input (content-space) ===

    /// Press inside the lanes: grab a trim handle or clip body, or seek on
    /// empty space.
    pub fn pointer_down(&mut self, point: Point, now: Instant) -> Result<(), EditError> {
        if !self.interaction.is_idle() {
            return Err(EditError::GestureInProgress);
        }
        let layouts = self.layouts();
        let Some(hit) = hit_test(&layouts, point, TRIM_HANDLE_PX) else {
            self.ctx.clear_selection();
            return self.seek_to_x(point.x, now);
        };
        let clip = self
            .clip(&hit.clip_id)
            .cloned()
            .ok_or_else(|| EditError::UnknownClip(hit.clip_id.clone()))?;
        match hit.zone {
            HitZone::Body => {
                let Some(layout) = layouts.iter().find(|l| l.clip_id == clip.id) else {
                    return Err(EditError::UnknownClip(clip.id));
                };
                let origin = Point::new(layout.rect.left, layout.track_index as f64 * TRACK_HEIGHT);
                self.interaction.begin_drag(&clip, origin, point)?;
            }
            HitZone::TrimStart => self.interaction.begin_trim(&clip, TrimSide::Start, point.x)?,
            HitZone::TrimEnd => self.interaction.begin_trim(&clip, TrimSide::End, point.x)?,
        }
        self.ctx.select(clip.id.as_str());
        Ok(())
    }

    /// Pointer moved. While resizing the panel `point.y` is in window space.
    pub fn pointer_move(&mut self, point: Point) {
        self.interaction.update(point, &self.scale, &self.tracks);
    }

    /// Pointer released: finish the gesture and send at most one request.
    pub fn pointer_up(&mut self, point: Point) {
        let Some(commit) = self.interaction.release(point, &self.scale, &self.tracks) else {
            return;
        };
        let story_id = self.story_id.clone();
        match commit {
            Commit::Move { clip_id, start_time_ms, track } => {
                info!("move {} to {}ms track {}", clip_id, start_time_ms, track);
                self.dispatcher.dispatch(Mutation::Move {
                    story_id,
                    item_id: clip_id,
                    body: MoveBody { start_time_ms, track },
                });
            }
            Commit::Trim { clip_id, trim_start_ms, trim_end_ms } => {
                info!("trim {} to ({}, {})", clip_id, trim_start_ms, trim_end_ms);
                self.dispatcher.dispatch(Mutation::Trim {
                    story_id,
                    item_id: clip_id,
                    body: TrimBody { trim_start_ms, trim_end_ms },
                });
            }
            Commit::PanelHeight(height) => {
                debug!("panel height {}", height);
                self.panel_height = height;
            }
        }
    }

    /// Gesture abandoned (pointer left the window, focus lost).
    pub fn pointer_cancel(&mut self) {
        self.interaction.cancel();
    }

    /// Press on the resize grip at window-space `y`.
    pub fn begin_panel_resize(&mut self, y: f64) -> Result<(), EditError> {
        self.interaction.begin_panel_resize(y, self.panel_height)
    }

    /// Click on the ruler or empty lane space at content-space `x`.
    pub fn seek_to_x(&mut self, x: f64, now: Instant) -> Result<(), EditError> {
        if self.interaction.blocks_seek() {
            return Err(EditError::SeekDuringGesture);
        }
        let ms = self.scale.px_to_ms_rounded(x).clamp(0, self.total_ms());
        self.player.seek(&self.story_id, ms, now);
        Ok(())
    }

    // === Commands ===

    /// Run a command; rejected commands also become a toast.
    pub fn execute(&mut self, command: EditorCommand, now: Instant) -> Result<(), EditError> {
        let result = self.run_command(command, now);
        if let Err(e) = &result {
            self.notifications.push(command_title(command), e.to_string(), now);
        }
        result
    }

    /// Resolve a key press through the keymap and run the bound command.
    pub fn handle_key(
        &mut self,
        key: &str,
        command_modifier: bool,
        text_input_focused: bool,
        now: Instant,
    ) -> Option<EditorCommand> {
        let command = self.keymap.handle_key(key, command_modifier, text_input_focused)?;
        debug!("key {} -> {:?}", key, command);
        let _ = self.execute(command, now);
        Some(command)
    }

    fn run_command(&mut self, command: EditorCommand, now: Instant) -> Result<(), EditError> {
        match command {
            EditorCommand::TogglePlayPause => {
                self.player.toggle(&self.story_id, &self.clips, now);
                Ok(())
            }
            EditorCommand::Stop => {
                self.player.stop();
                Ok(())
            }
            EditorCommand::Deselect => {
                self.ctx.clear_selection();
                Ok(())
            }
            EditorCommand::SplitAtPlayhead => self.split_at_playhead(),
            EditorCommand::DuplicateSelected => self.duplicate_selected(),
            EditorCommand::DeleteSelected => self.delete_selected(),
            EditorCommand::ZoomIn => self.zoom(TimeScale::zoom_in),
            EditorCommand::ZoomOut => self.zoom(TimeScale::zoom_out),
        }
    }

    fn ensure_idle(&self) -> Result<(), EditError> {
        if self.interaction.is_idle() { Ok(()) } else { Err(EditError::GestureInProgress) }
    }

    /// Split the selected clip at the playhead.
    pub fn split_at_playhead(&mut self) -> Result<(), EditError> {
        self.ensure_idle()?;
        let clip = self.selected()?;
        let split_time_ms = self.playhead_ms() - clip.start_time_ms;
        let effective_ms = clip.effective_duration_ms();
        if split_time_ms <= 0 || split_time_ms >= effective_ms {
            return Err(EditError::InvalidSplit { split_time_ms, effective_ms });
        }
        info!("split {} at +{}ms", clip.id, split_time_ms);
        self.dispatcher.dispatch(Mutation::Split {
            story_id: self.story_id.clone(),
            item_id: clip.id,
            body: SplitBody { split_time_ms },
        });
        self.ctx.clear_selection();
        Ok(())
    }

    pub fn duplicate_selected(&mut self) -> Result<(), EditError> {
        self.ensure_idle()?;
        let clip = self.selected()?;
        self.dispatcher.dispatch(Mutation::Duplicate {
            story_id: self.story_id.clone(),
            item_id: clip.id,
        });
        Ok(())
    }

    pub fn delete_selected(&mut self) -> Result<(), EditError> {
        self.ensure_idle()?;
        let clip = self.selected()?;
        self.dispatcher.dispatch(Mutation::Delete {
            story_id: self.story_id.clone(),
            item_id: clip.id,
        });
        self.ctx.clear_selection();
        Ok(())
    }

    fn zoom(&mut self, step: fn(&mut TimeScale)) -> Result<(), EditError> {
        self.ensure_idle()?;
        step(&mut self.scale);
        self.clamp_scroll();
        debug!("zoom: {} px/s", self.scale.pixels_per_second());
        Ok(())
    }

    // === Viewport ===

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width.max(0.0);
        self.clamp_scroll();
    }

    pub fn set_scroll_left(&mut self, scroll_left: f64) {
        self.scroll_left = scroll_left;
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let max_scroll = (self.extent().0 - self.viewport_width).max(0.0);
        self.scroll_left = self.scroll_left.clamp(0.0, max_scroll);
    }

    // === Frame ===

    /// Once per frame: advance playback, follow the playhead, apply finished
    /// requests and drop expired toasts.
    pub fn tick(&mut self, now: Instant) {
        if self.player.tick(now) && self.is_playing() {
            self.scroll_left = follow_playhead(
                self.scroll_left,
                self.viewport_width,
                self.extent().0,
                self.playhead_px(),
            );
        }
        for event in self.dispatcher.poll() {
            self.apply_event(event, now);
        }
        self.notifications.expire(now);
    }

    fn apply_event(&mut self, event: DispatchEvent, now: Instant) {
        match event {
            DispatchEvent::Applied { operation, item_id } => {
                debug!("{} of {} confirmed", operation, item_id);
            }
            DispatchEvent::ClipsReplaced { story_id, clips } => {
                if story_id == self.story_id {
                    self.set_clips(clips, now);
                }
            }
            DispatchEvent::Failed { title, message } => {
                self.notifications.push(title, message, now);
            }
        }
    }
}

fn command_title(command: EditorCommand) -> &'static str {
    match command {
        EditorCommand::SplitAtPlayhead => "Cannot split",
        EditorCommand::DuplicateSelected => "Cannot duplicate",
        EditorCommand::DeleteSelected => "Cannot delete",
        EditorCommand::ZoomIn | EditorCommand::ZoomOut => "Cannot zoom",
        EditorCommand::TogglePlayPause | EditorCommand::Stop | EditorCommand::Deselect => "Playback",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::api::recording::RecordingBackend;
    use crate::backend::DispatchMode;
    use crate::core::player::NullRenderer;
    use crate::entities::clip::test_clip;
    use std::sync::Arc;

    fn editor_with(clips: Vec<Clip>) -> (TimelineEditor, Arc<RecordingBackend>, Instant) {
        let backend = Arc::new(RecordingBackend::with_clips(clips));
        let dispatcher = MutationDispatcher::new(backend.clone(), DispatchMode::Inline);
        let player = Player::new(EditorContext::new(), Box::new(NullRenderer));
        let mut editor = TimelineEditor::new("story", player, dispatcher, &EditorSettings::default());
        let now = Instant::now();
        editor.refresh();
        editor.tick(now);
        assert!(editor.is_loaded());
        (editor, backend, now)
    }

    #[test]
    fn test_initial_fetch_loads_replica() {
        let (editor, backend, _) = editor_with(vec![test_clip("a", 3, 0, 1.0)]);
        assert_eq!(backend.fetch_count(), 1);
        assert_eq!(editor.clips().len(), 1);
        assert_eq!(editor.tracks(), &[3, 1, 0, -1]);
        assert_eq!(editor.requests_in_flight(), 0);
    }

    #[test]
    fn test_drag_sends_exactly_one_move() {
        // 1200ms on lane 0 is x=60..160, y=52..92 at 50 px/s.
        let (mut editor, backend, now) = editor_with(vec![test_clip("a", 0, 1200, 2.0)]);
        editor.pointer_down(Point::new(100.0, 70.0), now).unwrap();
        assert_eq!(editor.selected_clip().as_deref(), Some("a"));
        editor.pointer_move(Point::new(200.0, 100.0));
        assert!(editor.layouts()[0].dragging);
        editor.pointer_up(Point::new(290.0, 120.0));
        assert!(editor.interaction().is_idle());

        assert_eq!(
            backend.recorded(),
            vec![Mutation::Move {
                story_id: "story".into(),
                item_id: "a".into(),
                body: MoveBody { start_time_ms: 5000, track: -1 },
            }]
        );
        editor.tick(now);
        assert_eq!(editor.clip("a").unwrap().start_time_ms, 5000);
        assert_eq!(editor.clip("a").unwrap().track, -1);
    }

    #[test]
    fn test_drag_released_in_place_sends_nothing() {
        let (mut editor, backend, now) = editor_with(vec![test_clip("a", 0, 1200, 2.0)]);
        editor.pointer_down(Point::new(100.0, 70.0), now).unwrap();
        editor.pointer_move(Point::new(130.0, 75.0));
        editor.pointer_up(Point::new(100.0, 70.0));
        assert!(backend.recorded().is_empty());
        assert!(editor.interaction().is_idle());
    }

    #[test]
    fn test_trim_end_clamped_to_minimum() {
        let (mut editor, backend, now) = editor_with(vec![test_clip("a", 0, 0, 2.0)]);
        // Right edge of a 2s clip at 50 px/s is x=100.
        editor.pointer_down(Point::new(100.0, 70.0), now).unwrap();
        assert!(matches!(editor.interaction(), Interaction::Trimming(_)));
        editor.pointer_up(Point::new(-500.0, 70.0));
        assert_eq!(
            backend.recorded(),
            vec![Mutation::Trim {
                story_id: "story".into(),
                item_id: "a".into(),
                body: TrimBody { trim_start_ms: 0, trim_end_ms: 1900 },
            }]
        );
    }

    #[test]
    fn test_split_at_playhead() {
        let mut clip = test_clip("a", 0, 2000, 5.5);
        clip.trim_end_ms = 500;
        let (mut editor, backend, now) = editor_with(vec![clip]);

        editor.select_clip("a").unwrap();
        editor.seek_to_x(200.0, now).unwrap();
        assert_eq!(editor.playhead_ms(), 4000);
        editor.execute(EditorCommand::SplitAtPlayhead, now).unwrap();
        assert_eq!(
            backend.recorded(),
            vec![Mutation::Split {
                story_id: "story".into(),
                item_id: "a".into(),
                body: SplitBody { split_time_ms: 2000 },
            }]
        );
        assert_eq!(editor.selected_clip(), None);

        editor.select_clip("a").unwrap();
        editor.seek_to_x(50.0, now).unwrap();
        let err = editor.execute(EditorCommand::SplitAtPlayhead, now).unwrap_err();
        assert_eq!(err, EditError::InvalidSplit { split_time_ms: -1000, effective_ms: 5000 });
        assert_eq!(backend.recorded().len(), 1);
        assert_eq!(editor.notifications().count(), 1);
        assert_eq!(editor.selected_clip().as_deref(), Some("a"));
    }

    #[test]
    fn test_split_rejected_at_clip_edges() {
        let mut clip = test_clip("a", 0, 2000, 5.5);
        clip.trim_end_ms = 500;
        let (mut editor, backend, now) = editor_with(vec![clip]);
        editor.select_clip("a").unwrap();

        editor.seek_to_x(100.0, now).unwrap();
        assert_eq!(editor.playhead_ms(), 2000);
        let err = editor.execute(EditorCommand::SplitAtPlayhead, now).unwrap_err();
        assert_eq!(err, EditError::InvalidSplit { split_time_ms: 0, effective_ms: 5000 });

        editor.seek_to_x(350.0, now).unwrap();
        assert_eq!(editor.playhead_ms(), 7000);
        let err = editor.execute(EditorCommand::SplitAtPlayhead, now).unwrap_err();
        assert_eq!(err, EditError::InvalidSplit { split_time_ms: 5000, effective_ms: 5000 });

        assert!(backend.recorded().is_empty());
        assert_eq!(editor.selected_clip().as_deref(), Some("a"));
    }

    #[test]
    fn test_commands_need_selection() {
        let (mut editor, backend, now) = editor_with(vec![test_clip("a", 0, 0, 1.0)]);
        assert_eq!(editor.execute(EditorCommand::DeleteSelected, now), Err(EditError::NoSelection));
        assert_eq!(editor.execute(EditorCommand::DuplicateSelected, now), Err(EditError::NoSelection));
        assert!(backend.recorded().is_empty());
        assert_eq!(editor.notifications().count(), 2);
    }

    #[test]
    fn test_overlapping_gestures_rejected() {
        let (mut editor, _backend, now) =
            editor_with(vec![test_clip("a", 0, 1200, 2.0), test_clip("b", 1, 0, 2.0)]);
        editor.pointer_down(Point::new(100.0, 70.0), now).unwrap();
        assert_eq!(editor.begin_panel_resize(300.0), Err(EditError::GestureInProgress));
        // Lane 1 is row 0: clip b body around (50, 20).
        assert_eq!(editor.pointer_down(Point::new(50.0, 20.0), now), Err(EditError::GestureInProgress));
        assert_eq!(editor.interaction().active_clip_id(), Some("a"));
        assert_eq!(editor.seek_to_x(10.0, now), Err(EditError::SeekDuringGesture));
        assert_eq!(editor.execute(EditorCommand::ZoomIn, now), Err(EditError::GestureInProgress));

        editor.pointer_cancel();
        assert!(editor.interaction().is_idle());
        editor.seek_to_x(10.0, now).unwrap();
    }

    #[test]
    fn test_empty_space_click_seeks_and_deselects() {
        let (mut editor, _backend, now) = editor_with(vec![test_clip("a", 0, 0, 1.0)]);
        editor.select_clip("a").unwrap();
        editor.pointer_down(Point::new(400.0, 70.0), now).unwrap();
        assert_eq!(editor.selected_clip(), None);
        assert_eq!(editor.playhead_ms(), 8000);
        // Beyond the timeline the seek clamps to its length.
        editor.seek_to_x(10_000.0, now).unwrap();
        assert_eq!(editor.playhead_ms(), 10_000);
    }

    #[test]
    fn test_panel_resize_is_local() {
        let (mut editor, backend, _) = editor_with(vec![]);
        editor.begin_panel_resize(600.0).unwrap();
        editor.pointer_move(Point::new(0.0, 550.0));
        assert_eq!(editor.live_panel_height(), 250.0);
        assert_eq!(editor.panel_height(), 200.0);
        editor.pointer_up(Point::new(0.0, 100.0));
        assert_eq!(editor.panel_height(), 500.0);
        assert!(backend.recorded().is_empty());
    }

    #[test]
    fn test_keyboard_routes_and_suppression() {
        let (mut editor, backend, now) = editor_with(vec![test_clip("a", 0, 0, 1.0)]);
        editor.select_clip("a").unwrap();
        assert_eq!(editor.handle_key("Delete", false, true, now), None);
        assert!(backend.recorded().is_empty());

        assert_eq!(editor.handle_key("D", true, false, now), Some(EditorCommand::DuplicateSelected));
        assert_eq!(editor.handle_key("Backspace", false, false, now), Some(EditorCommand::DeleteSelected));
        let names: Vec<&str> = backend.recorded().iter().map(Mutation::name).collect();
        assert_eq!(names, vec!["Duplicate", "Delete"]);
        assert_eq!(editor.selected_clip(), None);

        editor.handle_key("Equals", true, false, now);
        assert_eq!(editor.scale().pixels_per_second(), 75.0);
    }

    #[test]
    fn test_failed_mutation_becomes_notification() {
        let (mut editor, backend, now) = editor_with(vec![test_clip("a", 0, 1200, 2.0)]);
        *backend.fail_with.lock().unwrap() = Some("locked".into());
        editor.pointer_down(Point::new(100.0, 70.0), now).unwrap();
        editor.pointer_up(Point::new(290.0, 120.0));
        editor.tick(now);

        let toast: Vec<&Notification> = editor.notifications().collect();
        assert_eq!(toast.len(), 1);
        assert_eq!(toast[0].title, "Move failed");
        // No refetch after a failure; the replica is unchanged.
        assert_eq!(backend.fetch_count(), 1);
        assert_eq!(editor.clip("a").unwrap().start_time_ms, 1200);

        editor.tick(now + Duration::from_secs(6));
        assert_eq!(editor.notifications().count(), 0);
    }

    #[test]
    fn test_playback_follows_playhead() {
        let (mut editor, _backend, now) = editor_with(vec![test_clip("a", 0, 0, 20.0)]);
        editor.set_viewport_width(400.0);
        editor.execute(EditorCommand::TogglePlayPause, now).unwrap();
        assert!(editor.is_playing());

        editor.tick(now + Duration::from_secs(2));
        assert_eq!(editor.scroll_left(), 0.0);
        editor.tick(now + Duration::from_secs(6));
        assert_eq!(editor.playhead_ms(), 6000);
        assert_eq!(editor.scroll_left(), 100.0);

        editor.execute(EditorCommand::Stop, now).unwrap();
        assert!(!editor.is_playing());
        assert_eq!(editor.playhead_ms(), 0);
    }

    #[test]
    fn test_audible_clips_track_playhead() {
        let (mut editor, _backend, now) =
            editor_with(vec![test_clip("a", 0, 0, 2.0), test_clip("b", 1, 1000, 3.0)]);
        assert!(editor.audible_clips().is_empty());

        editor.execute(EditorCommand::TogglePlayPause, now).unwrap();
        editor.tick(now + Duration::from_millis(1500));
        let ids: Vec<&str> = editor.audible_clips().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);

        editor.tick(now + Duration::from_secs(3));
        let ids: Vec<&str> = editor.audible_clips().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["b"]);

        editor.execute(EditorCommand::Stop, now).unwrap();
        assert!(editor.audible_clips().is_empty());
    }

    #[test]
    fn test_deleted_selection_cleared_on_refetch() {
        let (mut editor, backend, now) = editor_with(vec![test_clip("a", 0, 0, 1.0)]);
        editor.select_clip("a").unwrap();
        backend.clips.lock().unwrap().clear();
        editor.refresh();
        editor.tick(now);
        assert!(editor.clips().is_empty());
        assert_eq!(editor.selected_clip(), None);
        assert_eq!(editor.audio_url("a"), None);
    }

    #[test]
    fn test_audio_url_uses_generation() {
        let (editor, _backend, _) = editor_with(vec![test_clip("a", 0, 0, 1.0)]);
        assert_eq!(editor.audio_url("a").as_deref(), Some("memory://audio/gen-a"));
    }
}
