// MIT/Apache2 License

use approx::assert_abs_diff_eq;
use easel::{Context, Error, Format, ImageSurface, Operator, Pattern, Surface};

fn setup_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pixel(surface: &Surface, x: i32, y: i32) -> [f32; 4] {
    surface
        .with_backend::<ImageSurface, _, _>(|img| img.get_pixel(x, y))
        .unwrap()
        .unwrap()
}

#[test]
fn opaque_fill_covers_every_pixel() {
    setup_logging();

    let surface = Surface::image(Format::Argb32, 100, 100).unwrap();
    let mut cr = Context::new(&surface);
    cr.set_operator(Operator::Over);
    cr.set_source_rgb(0.0, 0.0, 1.0).unwrap();
    cr.rectangle(0.0, 0.0, 100.0, 100.0);
    cr.fill().unwrap();

    surface
        .with_backend::<ImageSurface, _, _>(|img| {
            for y in 0..100 {
                for x in 0..100 {
                    assert_eq!(img.get_pixel(x, y), Some([0.0, 0.0, 1.0, 1.0]), "at {}, {}", x, y);
                }
            }
        })
        .unwrap();
}

#[test]
fn fill_respects_clip() {
    setup_logging();

    let surface = Surface::image(Format::Argb32, 20, 20).unwrap();
    let mut cr = Context::new(&surface);
    cr.rectangle(5.0, 5.0, 10.0, 10.0);
    cr.clip().unwrap();
    cr.set_source_rgb(1.0, 0.0, 0.0).unwrap();
    cr.paint().unwrap();

    assert_eq!(pixel(&surface, 0, 0), [0.0; 4]);
    assert_eq!(pixel(&surface, 10, 10), [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(pixel(&surface, 15, 15), [0.0; 4]);
}

#[test]
fn source_replaces_and_in_clears() {
    setup_logging();

    let surface = Surface::image(Format::Argb32, 10, 10).unwrap();
    let mut cr = Context::new(&surface);
    cr.set_source_rgb(0.0, 1.0, 0.0).unwrap();
    cr.paint().unwrap();

    cr.set_operator(Operator::Source);
    cr.set_source_rgba(1.0, 0.0, 0.0, 0.5).unwrap();
    cr.rectangle(0.0, 0.0, 5.0, 10.0);
    cr.fill().unwrap();

    // source replaces what is under the shape, even with a translucent color
    let inside = pixel(&surface, 2, 2);
    assert_abs_diff_eq!(inside[1], 0.0);
    assert_abs_diff_eq!(inside[3], 0.5, epsilon = 1.0 / 255.0);
    assert_eq!(pixel(&surface, 7, 2), [0.0, 1.0, 0.0, 1.0]);

    cr.set_operator(Operator::In);
    cr.set_source_rgb(0.0, 0.0, 1.0).unwrap();
    cr.rectangle(0.0, 0.0, 5.0, 10.0);
    cr.fill().unwrap();

    assert_eq!(pixel(&surface, 7, 2), [0.0; 4]);
    let inside = pixel(&surface, 2, 2);
    assert_abs_diff_eq!(inside[2], 0.5, epsilon = 1.0 / 255.0);
    assert_abs_diff_eq!(inside[3], 0.5, epsilon = 1.0 / 255.0);
}

#[test]
fn thin_strokes_draw_nothing() {
    setup_logging();

    let surface = Surface::image(Format::Argb32, 10, 10).unwrap();
    let mut cr = Context::new(&surface);
    cr.set_source_rgb(1.0, 1.0, 1.0).unwrap();
    cr.set_line_width(0.0);
    cr.move_to(1.0, 5.0);
    cr.line_to(9.0, 5.0);
    cr.stroke().unwrap();

    assert!(!cr.has_current_point());
    surface
        .with_backend::<ImageSurface, _, _>(|img| {
            assert!(img.data().iter().all(|&b| b == 0));
        })
        .unwrap();
}

#[test]
fn paint_with_alpha_blends() {
    setup_logging();

    let surface = Surface::image(Format::Argb32, 4, 4).unwrap();
    let mut cr = Context::new(&surface);
    cr.set_source_rgb(1.0, 1.0, 1.0).unwrap();
    cr.paint_with_alpha(0.5).unwrap();

    let [r, g, b, a] = pixel(&surface, 1, 1);
    assert_abs_diff_eq!(a, 0.5, epsilon = 1.0 / 255.0);
    assert_abs_diff_eq!(r, 0.5, epsilon = 1.0 / 255.0);
    assert_abs_diff_eq!(g, r);
    assert_abs_diff_eq!(b, r);
}

#[test]
fn surfaces_can_be_sources() {
    setup_logging();

    let source = Surface::image(Format::Rgb24, 2, 2).unwrap();
    let mut src_cr = Context::new(&source);
    src_cr.set_source_rgb(1.0, 0.0, 0.0).unwrap();
    src_cr.paint().unwrap();

    let surface = Surface::image(Format::Argb32, 6, 6).unwrap();
    let mut cr = Context::new(&surface);
    cr.set_source_surface(&source, 2.0, 2.0).unwrap();
    cr.paint().unwrap();

    assert_eq!(pixel(&surface, 0, 0), [0.0; 4]);
    assert_eq!(pixel(&surface, 2, 2), [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(pixel(&surface, 3, 3), [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(pixel(&surface, 4, 4), [0.0; 4]);
}

#[test]
fn finished_targets_poison_the_context() {
    setup_logging();

    let surface = Surface::image(Format::Argb32, 4, 4).unwrap();
    surface.finish().unwrap();
    let mut cr = Context::new(&surface);

    assert_eq!(cr.status(), Err(Error::SurfaceFinished));
    assert_eq!(cr.paint(), Err(Error::SurfaceFinished));
}

#[test]
fn masks_scale_the_source() {
    setup_logging();

    let surface = Surface::image(Format::Argb32, 4, 4).unwrap();
    let mut cr = Context::new(&surface);
    cr.set_source_rgb(1.0, 1.0, 1.0).unwrap();
    cr.mask(&Pattern::rgba(0.0, 0.0, 0.0, 0.0)).unwrap();
    assert_eq!(pixel(&surface, 0, 0), [0.0; 4]);

    cr.mask(&Pattern::rgba(0.0, 0.0, 0.0, 1.0)).unwrap();
    assert_eq!(pixel(&surface, 0, 0), [1.0; 4]);
}
