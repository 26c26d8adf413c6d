use std::iter;

/// A loosely parsed version made of leading dot-separated numbers.
///
/// `v1.20rc1` parses into a leading `v`, components `[1, 20]` and build
/// text `rc1`. Anything that is not a number up front yields no components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemverLike {
    pub leading_v: bool,
    pub components: Vec<u64>,
    pub build: String,
    pub original: String,
}

impl SemverLike {
    /// Parses `raw`, keeping at most `max_components` numeric components.
    ///
    /// Components past the limit are folded back into the build text.
    pub fn parse(raw: &str, max_components: Option<usize>) -> Self {
        let (leading_v, rest) = match raw.strip_prefix('v') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let limit = max_components.unwrap_or(usize::MAX);
        let mut components = Vec::new();
        // Start of the build text: just past the last accepted component
        let mut tail = 0;
        let mut digits_start = None;

        let end = iter::once((rest.len(), '\0'));
        for (i, c) in rest.char_indices().chain(end) {
            if c.is_ascii_digit() {
                digits_start.get_or_insert(i);
                continue;
            }

            if let Some(start) = digits_start.take() {
                if components.len() == limit {
                    break;
                }
                // Overflowing numbers end the numeric run
                let Ok(value) = rest[start..i].parse::<u64>() else {
                    break;
                };
                components.push(value);
                tail = i;
            }

            // Runs of dots separate components
            if c != '.' {
                break;
            }
        }

        Self {
            leading_v,
            components,
            build: rest[tail..].to_string(),
            original: raw.to_string(),
        }
    }

    /// Returns the component at `index`, or zero when absent.
    pub fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}
