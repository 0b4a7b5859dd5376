//! Serialization and Deserialization implementation

use ::serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{Addr, AddrRange, Interval, RangeTree};

impl Serialize for Addr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Addr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Serialize for AddrRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AddrRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl<I: Interval + Serialize> Serialize for RangeTree<I> {
    /// Pre-order item sequence; the containment structure is rebuilt on
    /// deserialization.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter().map(|(item, _)| item))
    }
}

impl<'de, I: Interval + Deserialize<'de>> Deserialize<'de> for RangeTree<I> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = Vec::<I>::deserialize(deserializer)?;
        Ok(Self::from_unsorted(items).0)
    }
}

#[cfg(test)]
mod test {
    use crate::{Addr, AddrRange, RangeTree};

    #[test]
    fn addr_round_trip() {
        for s in ["10.0.0.1", "2001:db8::1"] {
            let addr: Addr = s.parse().unwrap();
            let json = serde_json::to_string(&addr).unwrap();
            assert_eq!(json, format!("\"{s}\""));
            assert_eq!(serde_json::from_str::<Addr>(&json).unwrap(), addr);
        }
    }

    #[test]
    fn range_round_trip() {
        for s in ["10.0.0.0/24", "10.0.0.250-10.0.0.255", "2001:db8::/32"] {
            let range: AddrRange = s.parse().unwrap();
            let json = serde_json::to_string(&range).unwrap();
            assert_eq!(json, format!("\"{s}\""));
            assert_eq!(serde_json::from_str::<AddrRange>(&json).unwrap(), range);
        }
    }

    #[test]
    fn tree_round_trip() {
        let tree: RangeTree<AddrRange> = ["10.0.0.0/8", "10.0.0.0/10", "192.0.2.0/24"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"["10.0.0.0/8","10.0.0.0/10","192.0.2.0/24"]"#);
        let back: RangeTree<AddrRange> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_string(), tree.to_string());
    }
}
