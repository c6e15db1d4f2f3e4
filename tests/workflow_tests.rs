//! Integration tests for imageops-bgremove workflows
//!
//! These tests chain preprocess, a deterministic mock model, output decoding
//! and compositing the way a caller wires the pipeline around a real runtime.

use std::cell::Cell;
use std::rc::Rc;

use image::{Luma, Rgb};
use imageops_bgremove::{
    BackgroundRemover, BoxError, ErrorKind, FnModel, Image, MaskCompositor, ModelSession,
    PipelineConfig, SaliencyModel, Tensor, TensorCodec, ThresholdMode,
};

/// Test helper to create a portrait-like image: bright subject on a dark border
fn create_test_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    Image::from_fn(width, height, |x, y| {
        let in_subject =
            (width / 4..3 * width / 4).contains(&x) && (height / 4..3 * height / 4).contains(&y);
        if in_subject {
            Rgb([220, 180, 150])
        } else {
            Rgb([30, 40, 50])
        }
    })
}

/// Mock network: a centered square of high saliency on a low background
fn centered_square_model(input: &Tensor) -> Result<Tensor, BoxError> {
    let (height, width) = (input.shape()[1], input.shape()[2]);
    let data = (0..height * width)
        .map(|i| {
            let (y, x) = (i / width, i % width);
            let inside = (height / 4..3 * height / 4).contains(&y)
                && (width / 4..3 * width / 4).contains(&x);
            if inside {
                0.9
            } else {
                0.05
            }
        })
        .collect();
    Ok(Tensor::new([1, 1, height, width], data)?)
}

#[test]
fn constant_output_end_to_end_is_uniform() {
    let image = create_test_image(500, 400);
    let model = FnModel::new(|input: &Tensor| {
        assert_eq!(input.shape(), &[3, 320, 320]);
        Ok(Tensor::filled([1, 1, 320, 320], 0.5))
    });
    let remover = BackgroundRemover::new(model);

    let composite = remover
        .remove_background(&image)
        .expect("Background removal should succeed");

    assert_eq!(composite.image.dimensions(), (500, 400));
    let fully_blank = composite.image.pixels().all(|pixel| *pixel == Rgb([0, 0, 0]));
    let fully_copied = composite.image == image;
    assert!(fully_blank || fully_copied);
    // A constant map decodes to zero, which falls below the cutoff
    assert!(fully_blank);
}

#[test]
fn centered_subject_is_kept_and_border_blanked() {
    let image = create_test_image(640, 480);
    let remover = BackgroundRemover::new(FnModel::new(centered_square_model));

    let composite = remover
        .remove_background(&image)
        .expect("Background removal should succeed");

    assert_eq!(composite.image.dimensions(), (640, 480));
    assert_eq!(composite.image.get_pixel(320, 240), &Rgb([220, 180, 150]));
    assert_eq!(composite.image.get_pixel(5, 5), &Rgb([0, 0, 0]));
    assert_eq!(composite.binary_mask.get_pixel(320, 240), &Luma([255]));
    assert_eq!(composite.binary_mask.get_pixel(5, 5), &Luma([0]));
}

#[test]
fn manual_stage_chain_matches_remover() {
    let image = create_test_image(200, 300);
    let codec = TensorCodec::default();
    let compositor = MaskCompositor::default();

    let input = codec.preprocess(&image).expect("Preprocess should succeed");
    let output = centered_square_model(&input).expect("Mock inference should succeed");
    let raw_mask = codec
        .decode_output(&output)
        .expect("Decoding should succeed");
    assert_eq!(raw_mask.dimensions(), (320, 320));

    let manual = compositor
        .composite(&image, &raw_mask)
        .expect("Composite should succeed");
    let chained = BackgroundRemover::new(FnModel::new(centered_square_model))
        .remove_background(&image)
        .expect("Background removal should succeed");

    assert_eq!(manual, chained);
}

#[test]
fn inverted_threshold_keeps_background_instead() {
    let image = create_test_image(100, 100);
    let config = PipelineConfig::default()
        .with_threshold(140, ThresholdMode::BinaryInverted)
        .with_background(Rgb([255, 255, 255]));
    let remover = BackgroundRemover::with_config(FnModel::new(centered_square_model), &config);

    let composite = remover.remove_background(&image).unwrap();
    assert_eq!(composite.image.get_pixel(50, 50), &Rgb([255, 255, 255]));
    assert_eq!(composite.image.get_pixel(2, 2), &Rgb([30, 40, 50]));
}

struct FailingRuntime {
    released: Rc<Cell<u32>>,
}

impl SaliencyModel for FailingRuntime {
    fn infer(&self, _input: &Tensor) -> Result<Tensor, BoxError> {
        Err("CUDA device unavailable".into())
    }

    fn release(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

#[test]
fn inference_failure_propagates_and_session_is_released() {
    let released = Rc::new(Cell::new(0));
    let session = ModelSession::open(|| {
        Ok::<_, BoxError>(FailingRuntime {
            released: Rc::clone(&released),
        })
    })
    .expect("Loading the mock runtime should succeed");

    let remover = BackgroundRemover::new(session);
    let error = remover
        .remove_background(&create_test_image(32, 32))
        .expect_err("Inference failure should propagate");
    assert_eq!(error.kind(), ErrorKind::InferenceFailure);
    assert!(error.to_string().contains("CUDA device unavailable"));
    assert_eq!(released.get(), 0);

    drop(remover);
    assert_eq!(released.get(), 1);
}

#[test]
fn shared_remover_serves_parallel_requests() {
    let remover = BackgroundRemover::new(FnModel::new(centered_square_model));

    std::thread::scope(|scope| {
        let handles: Vec<_> = [(64, 48), (48, 64), (320, 320)]
            .into_iter()
            .map(|(width, height)| {
                let remover = &remover;
                scope.spawn(move || {
                    let image = create_test_image(width, height);
                    remover.remove_background(&image).map(|c| c.image.dimensions())
                })
            })
            .collect();

        let dimensions: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect();
        assert_eq!(dimensions, vec![(64, 48), (48, 64), (320, 320)]);
    });
}
