use dune_backdrop::core::{DisplayContext, WinitSignals};
use dune_backdrop::{SceneAnimator, SceneConfig, Variant};

#[cfg(test)]
mod resize_tests {
    use super::*;

    fn scene() -> SceneAnimator {
        SceneAnimator::new(
            SceneConfig::for_variant(Variant::Simple),
            DisplayContext::new(1920, 1080),
        )
    }

    #[test]
    fn test_aspect_and_viewport_change_together() {
        let mut scene = scene();
        for (w, h) in [(640, 480), (1000, 250), (300, 900), (1, 1)] {
            scene.resize(w, h);
            let camera = scene.camera();
            assert_eq!(camera.viewport(), DisplayContext::new(w, h));
            assert!((camera.aspect() - w as f32 / h as f32).abs() < 1e-6);
        }
    }

    #[test]
    fn test_minimized_window_keeps_last_projection() {
        let mut scene = scene();
        scene.resize(800, 400);
        let before = scene.camera().view_proj();

        scene.resize(0, 0);
        scene.resize(0, 400);
        scene.resize(800, 0);

        assert_eq!(scene.camera().viewport(), DisplayContext::new(800, 400));
        assert_eq!(scene.camera().view_proj(), before);
    }

    #[test]
    fn test_signals_follow_window_size() {
        let mut signals = WinitSignals::new(3000.0, 60.0);
        signals.set_window_size(0, 0);
        signals.scroll_by(120.0);
        let s = signals.signals();
        assert!(s.pointer.is_finite());
        assert!((s.scroll_fraction - 0.04).abs() < 1e-6);
    }
}
