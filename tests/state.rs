// MIT/Apache2 License

use approx::assert_abs_diff_eq;
use easel::{Antialias, Context, Error, FillRule, Format, LineCap, LineJoin, Operator, RectangleF, Surface};

fn setup_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn context(width: i32, height: i32) -> Context {
    let surface = Surface::image(Format::Argb32, width, height).unwrap();
    Context::new(&surface)
}

#[test]
fn current_point_survives_restore_in_device_space() {
    setup_logging();

    let mut cr = context(100, 100);
    cr.save().unwrap();
    cr.translate(10.0, 10.0).unwrap();
    cr.move_to(0.0, 0.0);
    cr.line_to(5.0, 5.0);
    cr.restore().unwrap();

    let (x, y) = cr.current_point().unwrap();
    assert_abs_diff_eq!(x, 15.0);
    assert_abs_diff_eq!(y, 15.0);
}

#[test]
fn restore_brings_back_every_parameter() {
    setup_logging();

    let mut cr = context(10, 10);
    cr.set_source_rgb(1.0, 0.0, 0.0).unwrap();
    cr.set_line_width(3.0);
    cr.set_dash(&[2.0, 1.0], 0.5).unwrap();

    let before = (
        cr.operator(),
        cr.tolerance(),
        cr.antialias(),
        cr.fill_rule(),
        cr.line_width(),
        cr.line_cap(),
        cr.line_join(),
        cr.miter_limit(),
        cr.matrix(),
        cr.clip_extents(),
        cr.source().color(),
    );
    let dash_before = (cr.dash().0.to_vec(), cr.dash().1);

    cr.save().unwrap();
    cr.set_operator(Operator::Xor);
    cr.set_tolerance(0.5);
    cr.set_antialias(Antialias::None);
    cr.set_fill_rule(FillRule::EvenOdd);
    cr.set_line_width(7.0);
    cr.set_line_cap(LineCap::Round);
    cr.set_line_join(LineJoin::Bevel);
    cr.set_miter_limit(2.0);
    cr.set_dash(&[], 0.0).unwrap();
    cr.scale(2.0, 3.0).unwrap();
    cr.rectangle(0.0, 0.0, 1.0, 1.0);
    cr.clip().unwrap();
    cr.set_source_rgb(0.0, 1.0, 0.0).unwrap();
    cr.restore().unwrap();

    let after = (
        cr.operator(),
        cr.tolerance(),
        cr.antialias(),
        cr.fill_rule(),
        cr.line_width(),
        cr.line_cap(),
        cr.line_join(),
        cr.miter_limit(),
        cr.matrix(),
        cr.clip_extents(),
        cr.source().color(),
    );
    assert_eq!(before, after);
    assert_eq!(dash_before, (cr.dash().0.to_vec(), cr.dash().1));
}

#[test]
fn unbalanced_restore_is_an_error() {
    setup_logging();

    let mut cr = context(10, 10);
    cr.save().unwrap();
    cr.restore().unwrap();
    assert_eq!(cr.restore(), Err(Error::InvalidRestore));
    assert_eq!(cr.status(), Err(Error::InvalidRestore));
}

#[test]
fn disjoint_clips_clip_everything() {
    setup_logging();

    let mut cr = context(100, 100);
    cr.rectangle(0.0, 0.0, 10.0, 10.0);
    cr.clip().unwrap();
    cr.rectangle(50.0, 50.0, 10.0, 10.0);
    cr.clip().unwrap();

    assert!(!cr.in_clip(5.0, 5.0));
    assert!(!cr.in_clip(55.0, 55.0));
    assert_eq!(cr.clip_extents(), (0.0, 0.0, 0.0, 0.0));
    assert_eq!(cr.copy_clip_rectangle_list().unwrap(), Vec::new());
}

#[test]
fn clipping_only_shrinks() {
    setup_logging();

    let mut cr = context(100, 100);
    assert_eq!(cr.clip_extents(), (0.0, 0.0, 100.0, 100.0));

    cr.rectangle(10.0, 10.0, 50.0, 50.0);
    cr.clip().unwrap();
    let first = cr.clip_extents();
    assert_eq!(first, (10.0, 10.0, 60.0, 60.0));

    // a larger rectangle changes nothing, and so does the same one again
    cr.rectangle(0.0, 0.0, 90.0, 90.0);
    cr.clip().unwrap();
    assert_eq!(cr.clip_extents(), first);
    cr.rectangle(10.0, 10.0, 50.0, 50.0);
    cr.clip().unwrap();
    assert_eq!(cr.clip_extents(), first);

    assert_eq!(
        cr.copy_clip_rectangle_list().unwrap(),
        vec![RectangleF::new(10.0, 10.0, 50.0, 50.0)]
    );
}

#[test]
fn rotated_clips_are_not_rectangles() {
    setup_logging();

    let mut cr = context(100, 100);
    cr.translate(50.0, 50.0).unwrap();
    cr.rotate(0.3).unwrap();
    cr.rectangle(-10.0, -10.0, 20.0, 20.0);
    cr.clip().unwrap();

    assert!(cr.in_clip(0.0, 0.0));
    assert_eq!(cr.copy_clip_rectangle_list(), Err(Error::ClipNotRepresentable));
}
