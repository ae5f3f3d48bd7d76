use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default number of fractional bits for the fixed-point float embedding.
const DEFAULT_FXP_BITS: u32 = 16;

/// Secret-sharing protocol run by the simulated parties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    /// Additive sharing over power-of-two rings.
    #[default]
    Additive,
}

/// Partial runtime configuration.
///
/// Unset fields are filled with defaults by [`resolve`]. The [`Default`]
/// value leaves everything unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub protocol: Option<Protocol>,
    /// Fractional bits used to embed floats as fixed-point ring values.
    pub fxp_bits: Option<u32>,
}

/// Fully-specified runtime configuration produced by [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub protocol: Protocol,
    pub fxp_bits: u32,
}

/// Resolve a partial [`RuntimeConfig`] into a [`ResolvedConfig`].
///
/// Pure and stateless; the cluster calls this once at construction.
pub fn resolve(config: &RuntimeConfig) -> Result<ResolvedConfig> {
    let fxp_bits = config.fxp_bits.unwrap_or(DEFAULT_FXP_BITS);
    if fxp_bits == 0 || fxp_bits > 32 {
        return Err(Error::Config(format!("fxp_bits {fxp_bits} outside [1, 32]")));
    }
    Ok(ResolvedConfig {
        protocol: config.protocol.unwrap_or_default(),
        fxp_bits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let resolved = resolve(&RuntimeConfig::default()).unwrap();
        assert_eq!(resolved.protocol, Protocol::Additive);
        assert_eq!(resolved.fxp_bits, DEFAULT_FXP_BITS);
    }

    #[test]
    fn explicit_fields_survive() {
        let config = RuntimeConfig {
            protocol: Some(Protocol::Additive),
            fxp_bits: Some(20),
        };
        assert_eq!(resolve(&config).unwrap().fxp_bits, 20);
    }

    #[test]
    fn rejects_bad_precision() {
        for fxp_bits in [0, 33, 64] {
            let config = RuntimeConfig {
                fxp_bits: Some(fxp_bits),
                ..RuntimeConfig::default()
            };
            assert!(matches!(resolve(&config), Err(Error::Config(_))));
        }
    }
}
