#[cfg(feature = "kittest")]
mod trim_session_flow {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    use egui::Key;
    use egui_kittest::Harness;
    use wavetrim::gesture::TrackGeometry;
    use wavetrim::kittest::{harness_with_startup, write_sine_wav};
    use wavetrim::region::ShortClipPolicy;
    use wavetrim::source::AudioSource;
    use wavetrim::{LaunchConfig, TrimApp, TrimEvent};

    const READY_TIMEOUT: Duration = Duration::from_secs(20);

    fn make_temp_dir(tag: &str) -> PathBuf {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let mut dir = std::env::temp_dir();
        dir.push(format!(
            "wavetrim_kittest_{tag}_{}_{}_{}",
            std::process::id(),
            now_ms,
            seq
        ));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn fixture_wav(dir: &Path, secs: f32) -> PathBuf {
        let path = dir.join(format!("tone_{secs:.0}s.wav"));
        write_sine_wav(&path, secs, 48_000).expect("write fixture wav");
        path
    }

    fn wait_for_transport(harness: &mut Harness<'static, TrimApp>) {
        let start = Instant::now();
        loop {
            harness.run_steps(1);
            if harness.state().test_has_samples() && harness.state().test_region().is_some() {
                break;
            }
            if start.elapsed() > READY_TIMEOUT {
                panic!("transport ready timeout");
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    fn wait_for_mode(harness: &mut Harness<'static, TrimApp>, label: &str, limit: Duration) {
        let start = Instant::now();
        loop {
            harness.run_steps(1);
            if harness.state().test_mode_label() == label {
                break;
            }
            if start.elapsed() > limit {
                panic!(
                    "mode timeout: wanted {label}, still {}",
                    harness.state().test_mode_label()
                );
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    fn assert_close(got: f32, want: f32) {
        assert!(
            (got - want).abs() < 1e-3,
            "expected {want}, got {got}"
        );
    }

    fn assert_region_close(got: Option<(f32, f32)>, start: f32, end: f32) {
        let (s, e) = got.expect("region missing");
        assert_close(s, start);
        assert_close(e, end);
    }

    /// 300 px track over the clip, so x maps to time at 10 px per second
    /// for a 30 s fixture.
    fn track_geom(harness: &Harness<'static, TrimApp>) -> TrackGeometry {
        TrackGeometry::new(0.0, 300.0, harness.state().test_duration())
    }

    #[test]
    fn startup_file_reaches_ready_with_seeded_region() {
        let dir = make_temp_dir("seed");
        let mut cfg = LaunchConfig::default();
        cfg.audio_path = Some(fixture_wav(&dir, 30.0));
        let mut harness = harness_with_startup(cfg);

        wait_for_transport(&mut harness);
        assert_close(harness.state().test_duration(), 30.0);
        assert_region_close(harness.state().test_region(), 0.0, 30.0);
        assert!(!harness.state().test_is_playing());

        wait_for_mode(&mut harness, "ready", READY_TIMEOUT);
        assert!(harness.state().test_overview_bins() > 100);

        let events = harness.state_mut().take_events();
        let loaded: Vec<_> = events
            .iter()
            .filter(|ev| matches!(ev, TrimEvent::AudioLoaded { .. }))
            .collect();
        assert_eq!(loaded.len(), 1, "events: {events:?}");
        if let TrimEvent::AudioLoaded { duration } = loaded[0] {
            assert_close(*duration, 30.0);
        }
        assert!(!events
            .iter()
            .any(|ev| matches!(ev, TrimEvent::Error { .. })));

        // no repeats once the load is done
        harness.run_steps(5);
        assert!(harness.state_mut().take_events().is_empty());
    }

    #[test]
    fn space_key_toggles_playback_inside_region() {
        let dir = make_temp_dir("space");
        let mut cfg = LaunchConfig::default();
        cfg.audio_path = Some(fixture_wav(&dir, 30.0));
        let mut harness = harness_with_startup(cfg);
        wait_for_transport(&mut harness);

        harness.key_press(Key::Space);
        harness.run_steps(2);
        assert!(harness.state().test_is_playing());
        let pos = harness.state().test_position();
        assert!(pos >= 0.0 && pos < 30.0, "cursor left the clip: {pos}");

        harness.key_press(Key::Space);
        harness.run_steps(2);
        assert!(!harness.state().test_is_playing());
    }

    #[test]
    fn end_handle_drag_follows_pointer_with_length_rules() {
        let dir = make_temp_dir("end_drag");
        let mut cfg = LaunchConfig::default();
        cfg.audio_path = Some(fixture_wav(&dir, 30.0));
        cfg.min_len = 5.0;
        cfg.max_len = 20.0;
        let mut harness = harness_with_startup(cfg);
        wait_for_transport(&mut harness);
        assert_region_close(harness.state().test_region(), 0.0, 20.0);

        let geom = track_geom(&harness);
        // end handle sits at 200 px
        assert!(harness.state_mut().test_begin_drag(&geom, 200.0));
        assert!(harness.state().test_drag_active());
        // only one session at a time
        assert!(!harness.state_mut().test_begin_drag(&geom, 140.0));

        harness.state_mut().test_update_drag(&geom, 120.0);
        assert_region_close(harness.state().test_region(), 0.0, 12.0);

        // past the max length the edge stops at 20 s from the anchor
        harness.state_mut().test_update_drag(&geom, 280.0);
        assert_region_close(harness.state().test_region(), 0.0, 20.0);

        // below the min length it stops 5 s from the anchor
        harness.state_mut().test_update_drag(&geom, 30.0);
        assert_region_close(harness.state().test_region(), 0.0, 5.0);

        harness.state_mut().test_end_drag();
        assert!(!harness.state().test_drag_active());
        assert_region_close(harness.state().test_region(), 0.0, 5.0);
    }

    #[test]
    fn start_handle_drag_follows_pointer_with_length_rules() {
        let dir = make_temp_dir("start_drag");
        let mut cfg = LaunchConfig::default();
        cfg.audio_path = Some(fixture_wav(&dir, 30.0));
        cfg.min_len = 5.0;
        cfg.max_len = 20.0;
        let mut harness = harness_with_startup(cfg);
        wait_for_transport(&mut harness);

        let geom = track_geom(&harness);
        assert!(harness.state_mut().test_begin_drag(&geom, 2.0));

        harness.state_mut().test_update_drag(&geom, 80.0);
        assert_region_close(harness.state().test_region(), 8.0, 20.0);

        harness.state_mut().test_update_drag(&geom, 170.0);
        assert_region_close(harness.state().test_region(), 15.0, 20.0);

        // dragging out past the clip start restores the full span
        harness.state_mut().test_update_drag(&geom, -40.0);
        assert_region_close(harness.state().test_region(), 0.0, 20.0);

        harness.state_mut().test_end_drag();
        assert!(!harness.state().test_drag_active());
    }

    #[test]
    fn body_drag_slides_region_without_resizing() {
        let dir = make_temp_dir("body_drag");
        let mut cfg = LaunchConfig::default();
        cfg.audio_path = Some(fixture_wav(&dir, 30.0));
        cfg.min_len = 5.0;
        cfg.max_len = 20.0;
        let mut harness = harness_with_startup(cfg);
        wait_for_transport(&mut harness);

        harness.state_mut().test_set_region(10.0, 18.0);
        let geom = track_geom(&harness);
        // 140 px is 40 px from either handle, well past the grab zone
        assert!(harness.state_mut().test_begin_drag(&geom, 140.0));

        harness.state_mut().test_update_drag(&geom, 230.0);
        assert_region_close(harness.state().test_region(), 19.0, 27.0);

        // sliding past the clip end parks the region flush against it
        harness.state_mut().test_update_drag(&geom, 290.0);
        assert_region_close(harness.state().test_region(), 22.0, 30.0);

        harness.state_mut().test_update_drag(&geom, -100.0);
        assert_region_close(harness.state().test_region(), 0.0, 8.0);

        harness.state_mut().test_end_drag();
    }

    #[test]
    fn clicks_seek_inside_region_and_return_outside() {
        let dir = make_temp_dir("clicks");
        let mut cfg = LaunchConfig::default();
        cfg.audio_path = Some(fixture_wav(&dir, 30.0));
        let mut harness = harness_with_startup(cfg);
        wait_for_transport(&mut harness);

        harness.state_mut().test_set_region(10.0, 28.0);

        harness.state_mut().test_click(15.0);
        assert_close(harness.state().test_position(), 15.0);

        harness.state_mut().test_click(5.0);
        assert_close(harness.state().test_position(), 10.0);

        harness.state_mut().test_click(29.5);
        assert_close(harness.state().test_position(), 10.0);
    }

    #[test]
    fn save_trim_reports_selection_and_writes_json() {
        let dir = make_temp_dir("save");
        let out = dir.join("trim.json");
        let mut cfg = LaunchConfig::default();
        cfg.audio_path = Some(fixture_wav(&dir, 30.0));
        cfg.save_json = Some(out.clone());
        let mut harness = harness_with_startup(cfg);
        wait_for_transport(&mut harness);
        harness.state_mut().take_events();

        harness.state_mut().test_set_region(2.0, 25.0);
        harness.state_mut().test_save();

        let events = harness.state_mut().take_events();
        assert_eq!(events.len(), 1, "events: {events:?}");
        match &events[0] {
            TrimEvent::TrimSaved {
                start,
                end,
                duration,
            } => {
                assert_close(*start, 2.0);
                assert_close(*end, 25.0);
                assert_close(*duration, 30.0);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let text = std::fs::read_to_string(&out).expect("read saved selection");
        let doc: serde_json::Value = serde_json::from_str(&text).expect("parse saved selection");
        assert!((doc["start"].as_f64().unwrap() - 2.0).abs() < 1e-3);
        assert!((doc["end"].as_f64().unwrap() - 25.0).abs() < 1e-3);
        assert!((doc["duration"].as_f64().unwrap() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn changing_source_discards_drag_and_reseeds() {
        let dir = make_temp_dir("switch");
        let mut cfg = LaunchConfig::default();
        cfg.audio_path = Some(fixture_wav(&dir, 30.0));
        let mut harness = harness_with_startup(cfg);
        wait_for_transport(&mut harness);
        harness.state_mut().take_events();

        let geom = track_geom(&harness);
        // end handle of the seeded region sits at the track's right edge
        assert!(harness.state_mut().test_begin_drag(&geom, 297.0));
        assert!(harness.state().test_drag_active());

        let next = fixture_wav(&dir, 10.0);
        harness.state_mut().set_source(AudioSource::Path(next));
        assert!(!harness.state().test_drag_active());
        assert!(harness.state().test_region().is_none());
        assert!(!harness.state().test_has_samples());
        assert_eq!(harness.state().test_mode_label(), "loading");

        wait_for_transport(&mut harness);
        assert_close(harness.state().test_duration(), 10.0);
        assert_region_close(harness.state().test_region(), 0.0, 10.0);

        let events = harness.state_mut().take_events();
        let loaded: Vec<_> = events
            .iter()
            .filter(|ev| matches!(ev, TrimEvent::AudioLoaded { .. }))
            .collect();
        assert_eq!(loaded.len(), 1, "events: {events:?}");
        if let TrimEvent::AudioLoaded { duration } = loaded[0] {
            assert_close(*duration, 10.0);
        }
    }

    #[test]
    fn short_clip_rejected_under_reject_policy() {
        let dir = make_temp_dir("reject");
        let mut cfg = LaunchConfig::default();
        cfg.audio_path = Some(fixture_wav(&dir, 5.0));
        cfg.short_clips = ShortClipPolicy::Reject;
        let mut harness = harness_with_startup(cfg);

        wait_for_mode(&mut harness, "error", READY_TIMEOUT);
        assert!(!harness.state().test_has_samples());
        assert!(harness.state().test_region().is_none());
        assert!(harness.state().test_notice().is_some());

        let events = harness.state_mut().take_events();
        assert_eq!(events.len(), 1, "events: {events:?}");
        match &events[0] {
            TrimEvent::Error { message } => {
                assert!(message.contains("shorter"), "message: {message}");
            }
            other => panic!("unexpected event: {other:?}"),
        }

        harness.run_steps(5);
        assert!(harness.state_mut().take_events().is_empty());
    }
}
