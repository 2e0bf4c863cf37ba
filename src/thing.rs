use serde::{Deserialize, Deserializer};

/// A thing registered with the hub.
/// Fields missing from the hub's JSON, or set to null, take their zero value.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Thing {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub promoted: bool,
}

impl Thing {
    /// `<type>\t<name>\t\twith ID: <id>`
    pub fn listing_line(&self) -> String {
        format!("{}\t{}\t\twith ID: {}", self.kind, self.name, self.id)
    }

    /// `Deleting <type> <name> with ID: <id>`
    pub fn deletion_line(&self) -> String {
        format!("Deleting {} {} with ID: {}", self.kind, self.name, self.id)
    }

    pub fn dry_run_line(&self) -> String {
        format!("Would delete {} {} with ID: {}", self.kind, self.name, self.id)
    }
}

impl std::fmt::Display for Thing {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{} {} ({})", self.kind, self.name, self.id)
    }
}

/// Response body of `GET /rest/v1/things`.
#[derive(Deserialize, Debug, Default)]
pub struct Inventory {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Thing>,
}

impl Inventory {
    /// Decode the raw body returned by the hub.
    /// An empty body (as produced by a failed fetch) is a decode error.
    pub fn decode(body: &[u8]) -> anyhow::Result<Vec<Thing>> {
        let inventory: Self = from_json(body)?;
        Ok(inventory.data)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn from_json<T: serde::de::DeserializeOwned, S: AsRef<[u8]>>(text: S) -> anyhow::Result<T> {
    let text = text.as_ref();
    serde_json_path_to_error::from_slice(text)
        .map_err(|err| anyhow::anyhow!("{err}. Input: {}", String::from_utf8_lossy(text)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_inventory() {
        let things = Inventory::decode(
            br#"{"data":[
                {"id":"1","type":"light","name":"Lamp","promoted":true,"extra":{"x":1}},
                {"id":"2","type":"light","name":"Lamp2"},
                {"id":"3"}
            ]}"#,
        )
        .unwrap();
        k9::snapshot!(
            things,
            r#"
[
    Thing {
        id: "1",
        kind: "light",
        name: "Lamp",
        promoted: true,
    },
    Thing {
        id: "2",
        kind: "light",
        name: "Lamp2",
        promoted: false,
    },
    Thing {
        id: "3",
        kind: "",
        name: "",
        promoted: false,
    },
]
"#
        );
    }

    #[test]
    fn decode_empty_and_null() {
        assert!(Inventory::decode(br#"{"data":[]}"#).unwrap().is_empty());
        assert!(Inventory::decode(br#"{"data":null}"#).unwrap().is_empty());
        assert!(Inventory::decode(br#"{}"#).unwrap().is_empty());
    }

    #[test]
    fn decode_null_fields() {
        let things = Inventory::decode(
            br#"{"data":[
                {"id":"1","type":"light","name":null,"promoted":null},
                {"id":null,"type":null,"name":"Lamp","promoted":true}
            ]}"#,
        )
        .unwrap();
        k9::snapshot!(
            things,
            r#"
[
    Thing {
        id: "1",
        kind: "light",
        name: "",
        promoted: false,
    },
    Thing {
        id: "",
        kind: "",
        name: "Lamp",
        promoted: true,
    },
]
"#
        );
    }

    #[test]
    fn decode_failures() {
        assert!(Inventory::decode(b"").is_err());
        assert!(Inventory::decode(b"<html>not json</html>").is_err());

        let err = Inventory::decode(br#"{"data":[{"id":42}]}"#).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("invalid type"), "{message}");
    }

    #[test]
    fn output_lines() {
        let thing = Thing {
            id: "abc".to_string(),
            kind: "light".to_string(),
            name: "Desk Lamp".to_string(),
            promoted: false,
        };
        assert_eq!(thing.listing_line(), "light\tDesk Lamp\t\twith ID: abc");
        assert_eq!(thing.deletion_line(), "Deleting light Desk Lamp with ID: abc");
        assert_eq!(thing.dry_run_line(), "Would delete light Desk Lamp with ID: abc");
        assert_eq!(thing.to_string(), "light Desk Lamp (abc)");
    }
}
