use crate::ctx::Params;

/// Route path, segments prefixed with `:` capture a parameter, `*` matches any segment.
#[derive(Debug)]
pub struct Path {
    value: String,
    is_params: bool,
}

impl Path {
    pub fn new(value: String) -> Self {
        let is_params = value.contains(':') || value.contains('*');
        Self { value, is_params }
    }

    /// Match request path, returning captured parameters.
    pub fn matches(&self, path: &str) -> Option<Params> {
        if !self.is_params {
            return (path == self.value).then(Params::default);
        }

        let mut params = Params::default();
        let mut p1 = path.split('/');
        let mut p2 = self.value.split('/');

        loop {
            match (p1.next(), p2.next()) {
                (None, None) => return Some(params),
                (Some(p1), Some(p2)) if p2.starts_with(':') => {
                    if p1.is_empty() {
                        return None;
                    }
                    params.push(&p2[1..], p1);
                }
                (Some(_), Some("*")) => {}
                (Some(p1), Some(p2)) => if p1 != p2 { return None },
                _ => return None,
            }
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}
