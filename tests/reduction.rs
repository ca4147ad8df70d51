// MIT/Apache2 License

use easel::{
    geometry::Polygon, Antialias, Clip, Content, Context, Error, FillRule, NSOpType, Operator,
    Pattern, Rectangle, Result, SourceImage, Surface, SurfaceBackend, SurfaceFeatures,
};
use std::{any::Any, cell::Cell, rc::Rc};

fn setup_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A backend that draws nothing and only remembers how often it was asked to.
struct Counter {
    calls: Rc<Cell<usize>>,
}

impl Counter {
    fn bump(&self) -> Result {
        self.calls.set(self.calls.get() + 1);
        Ok(())
    }
}

impl SurfaceBackend for Counter {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn features(&self) -> SurfaceFeatures {
        SurfaceFeatures::all()
    }

    fn content(&self) -> Content {
        Content::ColorAlpha
    }

    fn extents(&self) -> Option<Rectangle> {
        Some(Rectangle::new(0, 0, 20, 20))
    }

    fn paint(&mut self, _op: Operator, _source: &Pattern, _clip: &Clip) -> Result {
        self.bump()
    }

    fn mask(&mut self, _op: Operator, _source: &Pattern, _mask: &Pattern, _clip: &Clip) -> Result {
        self.bump()
    }

    fn fill_polygon(
        &mut self,
        _op: Operator,
        _source: &Pattern,
        _polygon: &Polygon,
        _fill_rule: FillRule,
        _antialias: Antialias,
        _clip: &Clip,
    ) -> Result {
        self.bump()
    }

    fn create_similar(
        &self,
        _content: Content,
        _width: i32,
        _height: i32,
    ) -> Result<Box<dyn SurfaceBackend>> {
        Ok(Box::new(Counter {
            calls: self.calls.clone(),
        }))
    }

    fn snapshot(&self) -> Result<Box<dyn SurfaceBackend>> {
        Err(Error::NotSupported(NSOpType::SurfacePatterns))
    }

    fn acquire_source_image(&self) -> Result<SourceImage> {
        Err(Error::NotSupported(NSOpType::SurfacePatterns))
    }
}

fn counted() -> (Context, Rc<Cell<usize>>) {
    setup_logging();
    let calls = Rc::new(Cell::new(0));
    let surface = Surface::new(Counter {
        calls: calls.clone(),
    });
    (Context::new(&surface), calls)
}

#[test]
fn clear_sources_never_reach_the_backend() {
    let (mut cr, calls) = counted();
    cr.set_source_rgba(1.0, 0.0, 0.0, 0.0).unwrap();

    cr.set_operator(Operator::Over);
    cr.paint().unwrap();
    cr.rectangle(2.0, 2.0, 5.0, 5.0);
    cr.fill().unwrap();

    cr.set_operator(Operator::Add);
    cr.paint().unwrap();
    cr.rectangle(2.0, 2.0, 5.0, 5.0);
    cr.fill().unwrap();

    assert_eq!(calls.get(), 0);
    assert_eq!(cr.status(), Ok(()));
}

#[test]
fn everything_clipped_never_reaches_the_backend() {
    let (mut cr, calls) = counted();
    cr.rectangle(0.0, 0.0, 5.0, 5.0);
    cr.clip().unwrap();
    cr.rectangle(10.0, 10.0, 5.0, 5.0);
    cr.clip().unwrap();

    cr.set_source_rgb(0.0, 0.0, 1.0).unwrap();
    cr.paint().unwrap();
    cr.rectangle(0.0, 0.0, 20.0, 20.0);
    cr.fill().unwrap();

    assert_eq!(calls.get(), 0);
}

#[test]
fn clearing_a_clear_surface_is_skipped() {
    let (mut cr, calls) = counted();
    cr.set_operator(Operator::Source);
    cr.set_source_rgba(0.0, 0.0, 0.0, 0.0).unwrap();
    cr.paint().unwrap();
    assert_eq!(calls.get(), 0);

    // once something has been drawn, the same clear has work to do
    cr.set_operator(Operator::Over);
    cr.set_source_rgb(1.0, 1.0, 1.0).unwrap();
    cr.paint().unwrap();
    assert_eq!(calls.get(), 1);

    cr.set_operator(Operator::Source);
    cr.set_source_rgba(0.0, 0.0, 0.0, 0.0).unwrap();
    cr.paint().unwrap();
    assert_eq!(calls.get(), 2);
}
