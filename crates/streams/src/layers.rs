//! Pass-through stages for measuring what stacking lazy iterators costs.
//!
//! Each layer forwards every element unchanged.  Stacking several of them costs a little per element and nothing in
//! memory, which is what the iteration slides show.

/// A layer written as a named adapter whose `next` just asks the inner iterator.
#[derive(Clone, Debug)]
pub struct PassThrough<I> {
    inner: I,
}

impl<I> PassThrough<I> {
    pub fn new(inner: I) -> Self {
        PassThrough { inner }
    }
}

impl<I: Iterator> Iterator for PassThrough<I> {
    type Item = I::Item;

    #[inline]
    fn next(&mut self) -> Option<I::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A layer written as an identity closure over the inner iterator.
#[allow(clippy::map_identity)]
pub fn closure_layer<I: IntoIterator>(inner: I) -> impl Iterator<Item = I::Item> {
    inner.into_iter().map(|x| x)
}

/// A layer hidden behind dynamic dispatch, so every element costs a virtual call.
pub fn boxed_layer<'a, T: 'a>(inner: impl Iterator<Item = T> + 'a) -> Box<dyn Iterator<Item = T> + 'a> {
    Box::new(inner)
}

/// The three ways of writing a layer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LayerStyle {
    PassThrough,
    Closure,
    Boxed,
}

impl LayerStyle {
    pub const ALL: [LayerStyle; 3] = [LayerStyle::PassThrough, LayerStyle::Closure, LayerStyle::Boxed];

    pub fn name(&self) -> &'static str {
        match self {
            LayerStyle::PassThrough => "pass-through adapter",
            LayerStyle::Closure => "identity closure",
            LayerStyle::Boxed => "boxed dyn iterator",
        }
    }
}

/// Wrap `inner` in five layers of `style`.
///
/// The result is boxed once at the outside so the three styles share a return type; the five inner layers are still
/// written in the requested style.
pub fn five_layers<'a, T: 'a>(
    style: LayerStyle,
    inner: impl Iterator<Item = T> + 'a,
) -> Box<dyn Iterator<Item = T> + 'a> {
    match style {
        LayerStyle::PassThrough => Box::new(PassThrough::new(PassThrough::new(PassThrough::new(
            PassThrough::new(PassThrough::new(inner)),
        )))),
        LayerStyle::Closure => Box::new(closure_layer(closure_layer(closure_layer(closure_layer(
            closure_layer(inner),
        ))))),
        LayerStyle::Boxed => boxed_layer(boxed_layer(boxed_layer(boxed_layer(boxed_layer(inner))))),
    }
}

/// A lazy source of `0..size`.
pub fn range_source(size: u64) -> impl Iterator<Item = u64> {
    0..size
}

/// `0..size`, fully materialized before anything can read it.
pub fn list_source(size: u64) -> Vec<u64> {
    (0..size).collect()
}

/// Consume `items`, throwing every element away, and return how many there were.
pub fn run_through<I: IntoIterator>(items: I) -> usize {
    let mut count = 0;
    for _ in items {
        count += 1;
    }
    count
}
