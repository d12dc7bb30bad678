//! Human-readable names for control paths such as `<Keyboard>/leftShift`.

use regex::Regex;

/// Turns canonical control paths into labels for the controls page.
///
/// `<Gamepad>/buttonSouth` becomes `Button South [Gamepad]`, or `Button South` with the
/// device omitted. Paths without a `<Device>/` prefix are only prettified.
pub struct ControlPathFormatter {
    /// Matches `<Device>/control/...`
    path_pattern: Regex,

    /// Matches a lowercase letter or digit followed by an uppercase letter
    camel_boundary: Regex,
}

impl ControlPathFormatter {
    pub fn new() -> Self {
        Self {
            path_pattern: Regex::new(r"^<(?P<device>[^>]+)>/(?P<control>.+)$")
                .expect("Invalid control path regex"),
            camel_boundary: Regex::new(r"([a-z0-9])([A-Z])").expect("Invalid camel case regex"),
        }
    }

    pub fn format(&self, path: &str, omit_device: bool) -> String {
        let Some(caps) = self.path_pattern.captures(path) else {
            return self.prettify(path);
        };

        let control = self.prettify(&caps["control"]);
        if omit_device {
            control
        } else {
            format!("{} [{}]", control, &caps["device"])
        }
    }

    fn prettify(&self, control: &str) -> String {
        let spaced = self.camel_boundary.replace_all(control, "$1 $2");
        spaced
            .split(['/', ' '])
            .filter(|word| !word.is_empty())
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for ControlPathFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
