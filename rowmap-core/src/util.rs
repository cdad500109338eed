use std::fmt::{self, Display};

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Displays at most 497 characters of a string, followed by `...` when cut.
pub struct Truncated<'a>(pub &'a str);

impl Display for Truncated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.char_indices().nth(497) {
            Some((end, _)) => write!(f, "{}...", self.0[..end].trim_end()),
            None => f.write_str(self.0),
        }
    }
}

#[macro_export]
macro_rules! truncate_long {
    ($value:expr) => {
        $crate::Truncated(::std::convert::AsRef::<str>::as_ref(&$value))
    };
}
