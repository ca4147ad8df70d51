// MIT/Apache2 License

use easel::{Color, Context, Extend, Format, ImageSurface, Pattern, PatternType, Rectangle, Surface};

fn setup_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn red_to_blue(extend: Extend) -> Pattern {
    let mut pattern = Pattern::linear(0.0, 0.0, 100.0, 0.0);
    pattern.add_color_stop_rgb(0.0, 1.0, 0.0, 0.0).unwrap();
    pattern.add_color_stop_rgb(1.0, 0.0, 0.0, 1.0).unwrap();
    pattern.set_extend(extend);
    pattern
}

#[test]
fn gradients_inside_their_range_are_opaque() {
    setup_logging();

    let pattern = red_to_blue(Extend::None);
    let inside = Rectangle::new(10, 0, 50, 10);
    let outside = Rectangle::new(-10, 0, 50, 10);

    assert_eq!(pattern.pattern_type(), PatternType::Linear);
    assert_eq!(pattern.gradient_is_solid(Some(&inside)), None);
    assert!(pattern.is_opaque(Some(&inside)));
    assert!(!pattern.is_opaque(Some(&outside)));
    assert!(!pattern.is_opaque(None));

    // padding covers everything
    assert!(red_to_blue(Extend::Pad).is_opaque(None));
}

#[test]
fn single_colored_gradients_are_solid() {
    setup_logging();

    let mut pattern = Pattern::linear(0.0, 0.0, 10.0, 0.0);
    pattern.add_color_stop_rgb(0.0, 0.0, 1.0, 0.0).unwrap();
    pattern.add_color_stop_rgb(1.0, 0.0, 1.0, 0.0).unwrap();

    assert_eq!(
        pattern.gradient_is_solid(None),
        Some(Color::from_rgba(0.0, 1.0, 0.0, 1.0))
    );
}

#[test]
fn empty_surfaces_are_clear() {
    setup_logging();

    let surface = Surface::image(Format::Argb32, 0, 0).unwrap();
    assert!(Pattern::for_surface(&surface).is_clear());
    assert!(!Pattern::rgb(0.0, 0.0, 0.0).is_clear());
    assert!(Pattern::rgba(1.0, 1.0, 1.0, 0.0).is_clear());
}

#[test]
fn gradients_are_drawn_along_their_line() {
    setup_logging();

    let surface = Surface::image(Format::Argb32, 100, 1).unwrap();
    let mut cr = Context::new(&surface);
    cr.set_source(&red_to_blue(Extend::Pad)).unwrap();
    cr.paint().unwrap();

    surface
        .with_backend::<ImageSurface, _, _>(|img| {
            let left = img.get_pixel(0, 0).unwrap();
            let right = img.get_pixel(99, 0).unwrap();
            assert!(left[0] > 0.9 && left[2] < 0.1);
            assert!(right[2] > 0.9 && right[0] < 0.1);
            assert!(left[3] > 0.99 && right[3] > 0.99);
        })
        .unwrap();
}
