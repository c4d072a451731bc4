use std::fmt;

/// A single value the module can ask the bridge to render.
#[derive(Debug, Clone, PartialEq)]
pub enum Renderable<N> {
    Text(String),
    Number(f64),
    Node(N),
}

/// Update payload. The caller picks the variant at the boundary; the bridge
/// never guesses the shape of an incoming value.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<N> {
    Scalar(Renderable<N>),
    Sequence(Vec<Renderable<N>>),
}

impl<N> Renderable<N> {
    pub fn kind(&self) -> &'static str {
        match self {
            Renderable::Text(_) => "text",
            Renderable::Number(_) => "number",
            Renderable::Node(_) => "node",
        }
    }
}

impl<N> Payload<N> {
    pub fn text(text: impl Into<String>) -> Self {
        Payload::Scalar(Renderable::Text(text.into()))
    }

    pub fn number(value: f64) -> Self {
        Payload::Scalar(Renderable::Number(value))
    }

    pub fn node(node: N) -> Self {
        Payload::Scalar(Renderable::Node(node))
    }

    pub fn sequence(items: impl IntoIterator<Item = Renderable<N>>) -> Self {
        Payload::Sequence(items.into_iter().collect())
    }

    /// Sequence of text items, the shape string lists arrive in from module memory.
    pub fn texts<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Payload::Sequence(
            items
                .into_iter()
                .map(|item| Renderable::Text(item.into()))
                .collect(),
        )
    }

    pub fn shape(&self) -> PayloadShape<'_, N> {
        PayloadShape(self)
    }
}

/// Display adapter describing a payload without its contents, for logs and errors.
pub struct PayloadShape<'a, N>(&'a Payload<N>);

impl<N> fmt::Display for PayloadShape<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Payload::Scalar(item) => write!(f, "scalar {}", item.kind()),
            Payload::Sequence(items) => write!(f, "sequence of {}", items.len()),
        }
    }
}
