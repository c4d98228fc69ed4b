/// Enumerated rule-loading contexts.
/// Stacked up by technology and routing-grid loaders, and reported upon failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    Tech,
    Grid,
    Layer(String),
    Level(i32),
    ViaRule(String),
}
impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Tech => write!(f, "tech"),
            Self::Grid => write!(f, "routing grid"),
            Self::Layer(s) => write!(f, "layer {}", s),
            Self::Level(l) => write!(f, "level {}", l),
            Self::ViaRule(s) => write!(f, "via rule {}", s),
        }
    }
}
