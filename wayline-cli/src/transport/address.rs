use anyhow::bail;

/// Domain suffix the transport expects on normalized phone numbers.
const ADDRESS_SUFFIX: &str = "@c.us";

/// A configured delivery target: the human phone form plus the transport
/// address derived from it once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipient {
    display: String,
    address: String,
}

impl Recipient {
    /// Parse a `+`-prefixed phone number (spaces allowed) into a transport
    /// address by stripping `+` and whitespace and appending the domain
    /// suffix: `+90 555 111 22 33` becomes `905551112233@c.us`.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let display = raw.trim().to_string();
        let digits: String = display
            .chars()
            .filter(|c| *c != '+' && !c.is_whitespace())
            .collect();
        if digits.is_empty() {
            bail!("recipient '{raw}' has no digits");
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            bail!("recipient '{raw}' may only contain digits, '+' and spaces");
        }
        Ok(Self {
            address: format!("{digits}{ADDRESS_SUFFIX}"),
            display,
        })
    }

    /// Human-readable form for logs.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Transport addressing form.
    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Split a comma-separated recipient list, dropping empty entries. Order is
/// preserved; duplicates are not collapsed.
pub fn parse_recipient_list(s: &str) -> anyhow::Result<Vec<Recipient>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Recipient::parse)
        .collect()
}
