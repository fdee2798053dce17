pub mod domain {
    use serde_json::Value;

    /// Name used when a report carries no usable `device_name`.
    pub const DEFAULT_DEVICE_NAME: &str = "unknown_device";

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Protocol {
        Tcp,
        Udp,
    }

    impl Protocol {
        pub const ALL: [Protocol; 2] = [Protocol::Tcp, Protocol::Udp];

        pub fn as_str(self) -> &'static str {
            match self {
                Protocol::Tcp => "tcp",
                Protocol::Udp => "udp",
            }
        }

        pub fn label(self) -> &'static str {
            match self {
                Protocol::Tcp => "TCP",
                Protocol::Udp => "UDP",
            }
        }

        /// Bar fill as RGB. Sky blue for TCP, light green for UDP.
        pub fn color(self) -> (u8, u8, u8) {
            match self {
                Protocol::Tcp => (135, 206, 235),
                Protocol::Udp => (144, 238, 144),
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PortCount {
        pub port: u16,
        pub count: u64,
    }

    /// Ports of one protocol, validated once at load time.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PortList {
        Valid(Vec<PortCount>),
        Malformed(String),
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ProtocolSummary {
        pub ports: PortList,
    }

    impl Default for ProtocolSummary {
        fn default() -> Self {
            ProtocolSummary {
                ports: PortList::Valid(Vec::new()),
            }
        }
    }

    impl ProtocolSummary {
        /// Anything other than an object with a `ports` array counts as an
        /// empty summary. Entries of a `ports` array must be `[port, count]`.
        pub fn from_value(value: Option<&Value>) -> Self {
            let entries = match value
                .and_then(|v| v.get("ports"))
                .and_then(Value::as_array)
            {
                Some(entries) => entries,
                None => return ProtocolSummary::default(),
            };

            let ports = entries
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    parse_entry(entry).ok_or_else(|| format!("ports[{index}] is not a [port, count] pair: {entry}"))
                })
                .collect::<Result<Vec<_>, _>>();

            ProtocolSummary {
                ports: match ports {
                    Ok(ports) => PortList::Valid(ports),
                    Err(reason) => PortList::Malformed(reason),
                },
            }
        }

        /// First `n` entries in the order the analyzer wrote them.
        pub fn top(&self, n: usize) -> Result<&[PortCount], &str> {
            match &self.ports {
                PortList::Valid(ports) => Ok(&ports[..ports.len().min(n)]),
                PortList::Malformed(reason) => Err(reason),
            }
        }
    }

    fn parse_entry(entry: &Value) -> Option<PortCount> {
        match entry.as_array()?.as_slice() {
            [port, count] => Some(PortCount {
                port: u16::try_from(port.as_u64()?).ok()?,
                count: count.as_u64()?,
            }),
            _ => None,
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DeviceReport {
        pub device_name: String,
        pub tcp: ProtocolSummary,
        pub udp: ProtocolSummary,
    }

    impl DeviceReport {
        pub fn summary(&self, protocol: Protocol) -> &ProtocolSummary {
            match protocol {
                Protocol::Tcp => &self.tcp,
                Protocol::Udp => &self.udp,
            }
        }
    }
}

pub mod dto {
    use serde::Deserialize;
    use serde_json::Value;

    use super::domain::{DeviceReport, ProtocolSummary, DEFAULT_DEVICE_NAME};

    /// On-disk shape of `port_analysis_*.json`, as loose as the analyzer
    /// that writes it.
    #[derive(Debug, Deserialize)]
    pub struct RawDeviceReport {
        #[serde(default)]
        pub device_name: Option<Value>,
        #[serde(default)]
        pub tcp: Option<Value>,
        #[serde(default)]
        pub udp: Option<Value>,
    }

    impl From<RawDeviceReport> for DeviceReport {
        fn from(raw: RawDeviceReport) -> Self {
            let device_name = match raw.device_name {
                Some(Value::String(name)) => name,
                _ => DEFAULT_DEVICE_NAME.to_string(),
            };
            DeviceReport {
                device_name,
                tcp: ProtocolSummary::from_value(raw.tcp.as_ref()),
                udp: ProtocolSummary::from_value(raw.udp.as_ref()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::domain::*;
    use super::dto::RawDeviceReport;
    use serde_json::json;

    fn report(value: serde_json::Value) -> DeviceReport {
        serde_json::from_value::<RawDeviceReport>(value).unwrap().into()
    }

    #[test]
    fn test_full_report() {
        let r = report(json!({
            "device_name": "Router A",
            "tcp": {"ports": [[443, 120], [80, 95], [22, 3]]},
            "udp": {}
        }));
        assert_eq!(r.device_name, "Router A");
        assert_eq!(
            r.tcp.ports,
            PortList::Valid(vec![
                PortCount { port: 443, count: 120 },
                PortCount { port: 80, count: 95 },
                PortCount { port: 22, count: 3 },
            ])
        );
        assert_eq!(r.udp, ProtocolSummary::default());
    }

    #[test]
    fn test_missing_keys_fall_back() {
        let r = report(json!({}));
        assert_eq!(r.device_name, DEFAULT_DEVICE_NAME);
        assert_eq!(r.tcp.top(10), Ok(&[][..]));
        assert_eq!(r.udp.top(10), Ok(&[][..]));
    }

    #[test]
    fn test_non_string_device_name() {
        let r = report(json!({"device_name": null}));
        assert_eq!(r.device_name, DEFAULT_DEVICE_NAME);
        let r = report(json!({"device_name": 7}));
        assert_eq!(r.device_name, DEFAULT_DEVICE_NAME);
    }

    #[test]
    fn test_ports_not_an_array_is_empty() {
        let r = report(json!({"tcp": {"ports": "443"}, "udp": 5}));
        assert_eq!(r.tcp, ProtocolSummary::default());
        assert_eq!(r.udp, ProtocolSummary::default());
    }

    #[test]
    fn test_malformed_entry() {
        let r = report(json!({"tcp": {"ports": [[443, 1], [80]]}}));
        match &r.tcp.ports {
            PortList::Malformed(reason) => assert!(reason.contains("ports[1]"), "{reason}"),
            other => panic!("expected malformed, got {other:?}"),
        }
        assert!(r.tcp.top(10).is_err());
    }

    #[test]
    fn test_port_out_of_range_is_malformed() {
        let r = report(json!({"udp": {"ports": [[70000, 1]]}}));
        assert!(matches!(r.udp.ports, PortList::Malformed(_)));
    }

    #[test]
    fn test_negative_count_is_malformed() {
        let r = report(json!({"udp": {"ports": [[53, -1]]}}));
        assert!(matches!(r.udp.ports, PortList::Malformed(_)));
    }

    #[test]
    fn test_top_truncates_without_sorting() {
        let r = report(json!({"tcp": {"ports": [[1, 5], [2, 50], [3, 7]]}}));
        let top = r.tcp.top(2).unwrap();
        assert_eq!(top.iter().map(|p| p.port).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(r.tcp.top(10).unwrap().len(), 3);
    }

    #[test]
    fn test_protocol_labels() {
        assert_eq!(Protocol::Tcp.as_str(), "tcp");
        assert_eq!(Protocol::Udp.label(), "UDP");
        assert_ne!(Protocol::Tcp.color(), Protocol::Udp.color());
    }
}
