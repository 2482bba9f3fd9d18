use serde::{Deserialize, Serialize};

use super::{lenient_number, Applied, Record};

/// An audio output exposed by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub id: Option<u32>,
    pub name: String,
    pub enabled: bool,
    pub plugin: Option<String>,
}

impl Record for Output {
    fn is_leading_key(key: &str) -> bool {
        key.eq_ignore_ascii_case("outputid")
    }

    fn apply(&mut self, key: &str, value: &str) -> Applied {
        if key.eq_ignore_ascii_case("outputid") {
            if self.id.is_some() {
                return Applied::Duplicate;
            }
            self.id = lenient_number(value);
            return Applied::Set;
        }
        if key.eq_ignore_ascii_case("outputname") {
            if !self.name.is_empty() {
                return Applied::Duplicate;
            }
            self.name = value.to_string();
            return Applied::Set;
        }
        if key.eq_ignore_ascii_case("outputenabled") {
            self.enabled = value == "1";
            return Applied::Set;
        }
        if key.eq_ignore_ascii_case("plugin") {
            if self.plugin.is_some() {
                return Applied::Duplicate;
            }
            self.plugin = Some(value.to_string());
            return Applied::Set;
        }
        Applied::Ignored
    }
}

/// A named partition of the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub name: String,
}

impl Record for Partition {
    fn is_leading_key(key: &str) -> bool {
        key.eq_ignore_ascii_case("partition")
    }

    fn apply(&mut self, key: &str, value: &str) -> Applied {
        if key.eq_ignore_ascii_case("partition") {
            if !self.name.is_empty() {
                return Applied::Duplicate;
            }
            self.name = value.to_string();
            return Applied::Set;
        }
        Applied::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::super::{collect_records, pairs};
    use super::*;

    #[test]
    fn test_outputs() {
        let outputs: Vec<Output> = collect_records(pairs(&[
            ("outputid", "0"),
            ("outputname", "Living Room DAC"),
            ("plugin", "alsa"),
            ("outputenabled", "1"),
            ("outputid", "1"),
            ("outputname", "HTTP stream"),
            ("plugin", "httpd"),
            ("outputenabled", "0"),
        ]));
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].id, Some(0));
        assert!(outputs[0].enabled);
        assert_eq!(outputs[1].name, "HTTP stream");
        assert!(!outputs[1].enabled);
    }

    #[test]
    fn test_partitions() {
        let partitions: Vec<Partition> =
            collect_records(pairs(&[("partition", "default"), ("partition", "kitchen")]));
        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[1].name, "kitchen");
    }
}
