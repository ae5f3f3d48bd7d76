use crate::{
    buffer::{BufferView, NdBuffer},
    config::{resolve, RuntimeConfig},
    error::{Error, Result},
    scheme::{AdditiveScheme, SharingScheme},
    share::Visibility,
    symbol_table::SymbolTable,
};
use log::debug;

/// A local simulation of `world_size` parties, each with its own
/// [`SymbolTable`].
///
/// The cluster runs entirely inside one process: feeding a plaintext buffer
/// splits it into one share per party, outfeeding gathers the shares back
/// and reconstructs the plaintext. No networking is involved anywhere,
/// which makes the cluster a cheap stand-in for a real party deployment in
/// tests.
#[derive(Debug)]
pub struct LocalCluster<S: SharingScheme = AdditiveScheme> {
    tables: Vec<SymbolTable>,
    scheme: S,
}

impl LocalCluster<AdditiveScheme> {
    /// Create a cluster of `world_size` parties with an [`AdditiveScheme`]
    /// bound to the resolved `config`.
    pub fn new(world_size: usize, config: &RuntimeConfig) -> Result<LocalCluster<AdditiveScheme>> {
        let resolved = resolve(config)?;
        LocalCluster::with_scheme(world_size, AdditiveScheme::new(world_size, &resolved))
    }
}

impl<S: SharingScheme> LocalCluster<S> {
    /// Create a cluster with a caller-provided [`SharingScheme`].
    pub fn with_scheme(world_size: usize, scheme: S) -> Result<LocalCluster<S>> {
        if world_size == 0 {
            return Err(Error::InvalidWorldSize(world_size));
        }
        Ok(LocalCluster {
            tables: vec![SymbolTable::new(); world_size],
            scheme,
        })
    }

    /// Number of simulated parties.
    pub fn world_size(&self) -> usize {
        self.tables.len()
    }

    /// Split `view` and store one share per party under `name`.
    ///
    /// Either every table receives its share or, on failure, none does.
    pub fn feed(&mut self, name: &str, view: &BufferView<'_>, vtype: Visibility) -> Result<()> {
        self.feed_shares(name, view, vtype, None)
    }

    /// Like [`feed`], with the value attributed to party `owner` before
    /// splitting. What the owner rank means is up to the scheme.
    ///
    /// [`feed`]: LocalCluster::feed
    pub fn feed_from(
        &mut self,
        name: &str,
        view: &BufferView<'_>,
        vtype: Visibility,
        owner: usize,
    ) -> Result<()> {
        self.feed_shares(name, view, vtype, Some(owner))
    }

    fn feed_shares(
        &mut self,
        name: &str,
        view: &BufferView<'_>,
        vtype: Visibility,
        owner: Option<usize>,
    ) -> Result<()> {
        debug!("feed {name} shape = {:?} as {vtype:?}", view.shape());
        let shares = self.scheme.split(view, vtype, owner)?;
        if shares.len() != self.tables.len() {
            return Err(Error::ShareCountMismatch {
                got: shares.len(),
                want: self.tables.len(),
            });
        }
        for (table, share) in self.tables.iter_mut().zip(shares) {
            table.set_var(name, share);
        }
        Ok(())
    }

    /// Gather the shares of `name` from every party and reconstruct the
    /// plaintext into a fresh caller-owned buffer.
    ///
    /// Tables are read, never modified.
    pub fn outfeed(&self, name: &str) -> Result<NdBuffer> {
        debug!("outfeed {name}");
        let mut shares = Vec::with_capacity(self.tables.len());
        for (party, table) in self.tables.iter().enumerate() {
            let share = table.get_var(name).ok_or_else(|| Error::MissingVariable {
                name: name.to_owned(),
                party,
            })?;
            shares.push(share.clone());
        }
        let dtype = self.scheme.element_type(&shares)?;
        let mut out = NdBuffer::zeros(dtype, shares[0].shape());
        self.scheme.combine(&shares, &mut out.view_mut())?;
        Ok(out)
    }

    /// Borrow party `party`'s [`SymbolTable`].
    pub fn table(&self, party: usize) -> Result<&SymbolTable> {
        self.tables.get(party).ok_or(Error::InvalidPartyId(party))
    }

    /// Mutably borrow party `party`'s [`SymbolTable`].
    ///
    /// Writes through this reference bypass the feed invariants; the caller
    /// takes over responsibility for cross-party consistency.
    pub fn table_mut(&mut self, party: usize) -> Result<&mut SymbolTable> {
        self.tables
            .get_mut(party)
            .ok_or(Error::InvalidPartyId(party))
    }
}
