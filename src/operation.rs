use crate::error::UsageError;
use crate::thing::Thing;
use std::str::FromStr;

/// The filter rules a run can apply to the inventory.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::EnumString,
    strum_macros::Display,
    strum_macros::VariantNames,
)]
#[strum(serialize_all = "lowercase")]
pub enum MethodKind {
    Type,
    Name,
    Promoted,
    List,
}

/// The methods accepted on the command line, in the order they are
/// advertised in usage and error messages.
pub const SUPPORTED_METHODS: &[MethodKind] = &[
    MethodKind::Type,
    MethodKind::Name,
    MethodKind::Promoted,
    MethodKind::List,
];

pub fn supported_methods_list(supported: &[MethodKind]) -> String {
    supported
        .iter()
        .map(|kind| kind.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A validated request derived from the command line.
/// Every kind other than `List` carries its filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List,
    Type(String),
    Name(String),
    Promoted(bool),
}

impl Operation {
    /// Interpret the raw arguments (program name excluded).
    ///
    /// A lone argument is only valid when it is `list`. Otherwise the
    /// first argument names the method and every remaining argument is
    /// joined with single spaces to form the filter value, so that
    /// `name living room` matches the same things as `name "living room"`.
    pub fn from_args<S: AsRef<str>>(
        args: &[S],
        supported: &[MethodKind],
    ) -> Result<Self, UsageError> {
        let Some((method, rest)) = args.split_first() else {
            return Err(UsageError::Arguments);
        };
        let method = method.as_ref();

        if rest.is_empty() && method != "list" {
            return Err(UsageError::Arguments);
        }

        let kind = MethodKind::from_str(method)
            .ok()
            .filter(|kind| supported.contains(kind))
            .ok_or_else(|| UsageError::InvalidMethod {
                method: method.to_string(),
                supported: supported.to_vec(),
            })?;

        match kind {
            MethodKind::List => {
                if !rest.is_empty() {
                    log::debug!("list takes no value; ignoring {} argument(s)", rest.len());
                }
                Ok(Self::List)
            }
            MethodKind::Type => Ok(Self::Type(join_value(rest))),
            MethodKind::Name => Ok(Self::Name(join_value(rest))),
            MethodKind::Promoted => {
                let value = join_value(rest);
                match parse_bool(&value) {
                    Some(promoted) => Ok(Self::Promoted(promoted)),
                    None => Err(UsageError::InvalidBool { value }),
                }
            }
        }
    }

    pub fn kind(&self) -> MethodKind {
        match self {
            Self::List => MethodKind::List,
            Self::Type(_) => MethodKind::Type,
            Self::Name(_) => MethodKind::Name,
            Self::Promoted(_) => MethodKind::Promoted,
        }
    }

    /// Whether `thing` is selected by this operation.
    /// `List` selects everything; the others compare case-sensitively.
    pub fn selects(&self, thing: &Thing) -> bool {
        match self {
            Self::List => true,
            Self::Type(kind) => thing.kind == *kind,
            Self::Name(fragment) => thing.name.contains(fragment.as_str()),
            Self::Promoted(promoted) => thing.promoted == *promoted,
        }
    }
}

fn join_value<S: AsRef<str>>(rest: &[S]) -> String {
    rest.iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Accepts the same spellings as the usual boolean flag parsers:
/// `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

pub fn usage_text(supported: &[MethodKind]) -> String {
    format!(
        "Usage:
\tsphere-pruner [method] [value]

Supported methods:
\t {methods}

Examples:
\tTo delete all non-promoted things, use:                 ... promoted false
\tTo delete all things with type 'light', use:            ... type light
\tTo delete all things with names containing 'jim', use:  ... name jim
\tTo list all the things, use:                            ... list
",
        methods = supported_methods_list(supported)
    )
}
