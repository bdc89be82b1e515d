use std::collections::{BTreeSet, HashMap};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::{
    cancel::CancelSignal,
    errors::Error,
    models::{capability::CapabilitySupport, identifier::Vin},
    providers::CapabilityService,
};

/// VINs per capability request.
pub const BATCH_SIZE: usize = 100;

/// Strips a leading `Bearer` scheme and one surrounding quote from a pasted
/// token. Returns `None` when nothing is left.
pub fn clean_credential(raw: &str) -> Option<SecretString> {
    let mut token = raw.trim();
    if token.get(..6).is_some_and(|scheme| scheme.eq_ignore_ascii_case("bearer")) {
        let rest = &token[6..];
        if rest.starts_with(char::is_whitespace) {
            token = rest.trim_start();
        }
    }
    let token = token.strip_prefix(['"', '\'']).unwrap_or(token);
    let token = token.strip_suffix(['"', '\'']).unwrap_or(token);
    (!token.is_empty()).then(|| SecretString::new(token.into()))
}

/// Looks up capability support for `identifiers`, merged per VIN.
///
/// Without a usable credential no request is made and the map is empty.
/// Otherwise identifiers are de-duplicated, sorted and sent in batches of
/// [`BATCH_SIZE`]. Observations are merged in request order, so a field
/// reported by a later batch overwrites the same field from an earlier one.
/// Any failed batch fails the whole lookup.
pub async fn fetch_support<C, I>(
    service: &C,
    identifiers: I,
    credential: Option<&SecretString>,
    region: u32,
    cancel: &CancelSignal,
) -> Result<HashMap<Vin, CapabilitySupport>, Error>
where
    C: CapabilityService + Sync + ?Sized,
    I: IntoIterator<Item = Vin>,
{
    let mut support: HashMap<Vin, CapabilitySupport> = HashMap::new();
    let Some(token) = credential.and_then(|c| clean_credential(c.expose_secret())) else {
        debug!("no capability credential; skipping lookup");
        return Ok(support);
    };

    let vins: Vec<Vin> = identifiers.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    let batches = vins.chunks(BATCH_SIZE);
    let batch_count = batches.len();

    for (index, batch) in batches.enumerate() {
        cancel.check()?;
        let observations = service.lookup(batch, region, &token).await?;
        debug!(batch = index + 1, of = batch_count, observations = observations.len(), "capability batch");
        for observation in observations {
            support
                .entry(observation.vin)
                .or_default()
                .merge(observation.support);
        }
    }

    info!(vins = vins.len(), matched = support.len(), "capability lookup complete");
    Ok(support)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exposed(raw: &str) -> Option<String> {
        clean_credential(raw).map(|s| s.expose_secret().to_string())
    }

    #[test]
    fn strips_scheme_and_quotes() {
        assert_eq!(exposed("  Bearer   abc.def ").as_deref(), Some("abc.def"));
        assert_eq!(exposed("bearer \"abc\"").as_deref(), Some("abc"));
        assert_eq!(exposed("'abc'").as_deref(), Some("abc"));
        assert_eq!(exposed("BearerToken").as_deref(), Some("BearerToken"));
    }

    #[test]
    fn blank_credentials_are_unusable() {
        assert!(clean_credential("").is_none());
        assert!(clean_credential("   ").is_none());
        assert!(clean_credential("Bearer \"\"").is_none());
    }
}
