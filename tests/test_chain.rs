mod common;
use common::*;

/// Adds a constant to every channel (saturating)
struct Brighten(u8);

impl FrameProcessor for Brighten {
    fn process(&mut self, mut frame: Frame) -> anyhow::Result<Frame> {
        for p in frame.pixels_mut() {
            for c in p.0.iter_mut() {
                *c = c.saturating_add(self.0);
            }
        }
        Ok(frame)
    }

    fn name(&self) -> &str {
        "Brighten"
    }
}

/// Inverts every channel
struct Invert;

impl FrameProcessor for Invert {
    fn process(&mut self, mut frame: Frame) -> anyhow::Result<Frame> {
        for p in frame.pixels_mut() {
            for c in p.0.iter_mut() {
                *c = 255 - *c;
            }
        }
        Ok(frame)
    }

    fn name(&self) -> &str {
        "Invert"
    }
}

#[test]
fn test_empty_chain_returns_copy() -> anyhow::Result<()> {
    let mut chain = ProcessorChain::new();
    let frame = gradient_frame(32, 24, 3);

    let out = chain.apply(&frame)?;
    assert_eq!(out, frame);
    assert!(chain.is_empty());
    Ok(())
}

#[test]
fn test_apply_folds_in_insertion_order() -> anyhow::Result<()> {
    let mut chain = ProcessorChain::new();
    let brighten = chain.register(Box::new(Brighten(40)));
    let invert = chain.register(Box::new(Invert));
    chain.add(brighten);
    chain.add(invert);

    let frame = gradient_frame(16, 16, 9);
    let expected = Invert.process(Brighten(40).process(frame.clone())?)?;
    let out = chain.apply(&frame)?;
    assert_eq!(out, expected);

    // Reversed order gives a different fold
    let mut reversed = ProcessorChain::new();
    let invert = reversed.register(Box::new(Invert));
    let brighten = reversed.register(Box::new(Brighten(40)));
    reversed.add(invert);
    reversed.add(brighten);
    let expected_reversed = Brighten(40).process(Invert.process(frame.clone())?)?;
    assert_eq!(reversed.apply(&frame)?, expected_reversed);
    assert_ne!(expected, expected_reversed);
    Ok(())
}

#[test]
fn test_apply_leaves_input_untouched() -> anyhow::Result<()> {
    let mut chain = ProcessorChain::new();
    let invert = chain.register(Box::new(Invert));
    chain.add(invert);

    let frame = gradient_frame(16, 16, 1);
    let snapshot = frame.clone();
    chain.apply(&frame)?;
    assert_eq!(frame, snapshot);
    Ok(())
}

#[test]
fn test_add_then_remove_restores_chain() {
    let mut chain = ProcessorChain::new();
    let a = chain.register(Box::new(Brighten(1)));
    let b = chain.register(Box::new(Invert));
    let c = chain.register(Box::new(Brighten(2)));
    chain.add(a);
    chain.add(b);
    let before = chain.active().to_vec();

    chain.add(c);
    assert_eq!(chain.len(), 3);
    assert!(chain.remove(c));

    assert_eq!(chain.active(), before.as_slice());
}

#[test]
fn test_remove_absent_is_noop() {
    let mut chain = ProcessorChain::new();
    let a = chain.register(Box::new(Invert));
    let b = chain.register(Box::new(Invert));
    chain.add(a);

    assert!(!chain.remove(b));
    assert_eq!(chain.active(), &[a]);
}

#[test]
fn test_membership_is_by_instance() {
    let mut chain = ProcessorChain::new();
    let first = chain.register(Box::new(Brighten(5)));
    let second = chain.register(Box::new(Brighten(5)));
    assert_ne!(first, second);

    chain.add(first);
    assert!(chain.contains(first));
    assert!(!chain.contains(second));
}

#[test]
fn test_toggle_adds_then_removes() {
    let mut chain = ProcessorChain::new();
    let blur = chain.register(Box::new(BlurProcessor::default()));

    assert_eq!(chain.toggle(blur), Toggle::Added);
    assert!(chain.contains(blur));
    assert_eq!(chain.toggle(blur), Toggle::Removed);
    assert!(!chain.contains(blur));
}

#[test]
fn test_add_allows_duplicates() -> anyhow::Result<()> {
    let mut chain = ProcessorChain::new();
    let brighten = chain.register(Box::new(Brighten(10)));
    chain.add(brighten);
    chain.add(brighten);
    assert_eq!(chain.len(), 2);

    let frame = solid_frame(4, 4, [100, 100, 100]);
    let out = chain.apply(&frame)?;
    assert_eq!(out.get_pixel(0, 0).0, [120, 120, 120]);

    // One remove drops one occurrence
    chain.remove(brighten);
    assert_eq!(chain.len(), 1);
    Ok(())
}

#[test]
fn test_clear_empties_chain() {
    let mut chain = ProcessorChain::new();
    let a = chain.register(Box::new(Invert));
    let b = chain.register(Box::new(Brighten(3)));
    chain.add(a);
    chain.add(b);

    chain.clear();
    assert!(chain.is_empty());
    assert!(chain.active_names().is_empty());
    assert!(chain.processor(a).is_some());
}

#[test]
fn test_active_names_follow_order() {
    let mut chain = ProcessorChain::new();
    let edges = chain.register(Box::new(EdgeDetectionProcessor::default()));
    let blur = chain.register(Box::new(BlurProcessor::default()));
    chain.add(blur);
    chain.add(edges);

    assert_eq!(chain.active_names(), vec!["Gaussian Blur", "Edge Detection"]);
}

#[test]
fn test_motion_state_survives_toggle() -> anyhow::Result<()> {
    let mut chain = ProcessorChain::new();
    let motion = chain.register(Box::new(MotionDetectionProcessor::default()));

    let empty = solid_frame(200, 200, [0, 0, 0]);
    let square = frame_with_square(200, 200, 70, 70, 60);

    chain.toggle(motion);
    // Cold start: passes through
    assert_eq!(chain.apply(&empty)?, empty);

    chain.toggle(motion);
    chain.toggle(motion);

    // Same instance, so the stored frame is still there and motion shows up
    let out = chain.apply(&square)?;
    assert_ne!(out, square);
    assert!(count_color(&out, [0, 255, 0]) > 0);
    Ok(())
}

#[test]
fn test_motion_state_survives_clear() -> anyhow::Result<()> {
    let mut chain = ProcessorChain::new();
    let motion = chain.register(Box::new(MotionDetectionProcessor::default()));

    chain.add(motion);
    chain.apply(&solid_frame(200, 200, [0, 0, 0]))?;
    chain.clear();
    chain.add(motion);

    let square = frame_with_square(200, 200, 70, 70, 60);
    assert_ne!(chain.apply(&square)?, square);
    Ok(())
}
