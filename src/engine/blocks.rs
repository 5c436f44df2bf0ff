// SPDX-License-Identifier: AGPL-3.0-or-later

//! Operations on a clump's block set.
use ::log::debug;

use crate::engine::{Baobab, EngineError};
use crate::store::{BlockSpec, KeyPattern};

impl Baobab {
    /// Adds a specifier to the clump's block set and purges the content it covers.
    ///
    /// Authors with an identity in the identity store can not be blocked. The purge is narrow:
    /// only the newly blocked specifier's scope is removed. Blocking the same specifier twice
    /// is a no-op. Returns the full block list.
    pub fn block(&self, spec: &BlockSpec, clump_id: &str) -> Result<Vec<BlockSpec>, EngineError> {
        let spec = self.resolve_spec(spec)?;
        let clump = self.clump(clump_id)?;

        if let BlockSpec::Author(author) | BlockSpec::AuthorLog(author, _) = &spec {
            let identities = self.identities.lock().unwrap();
            if identities
                .authors()
                .iter()
                .any(|own| own.as_str() == author)
            {
                return Err(EngineError::BlockedLocalIdentity);
            }
        }

        let mut metadata = clump.metadata.lock().unwrap();
        let newly_added = metadata.insert(spec.clone())?;
        let blocks = metadata.list();
        drop(metadata);

        if newly_added {
            debug!("Blocking {} in clump {}", spec, clump_id);

            let pattern = match &spec {
                BlockSpec::Author(author) => KeyPattern::any().author(author),
                BlockSpec::LogId(log_id) => KeyPattern::any().log_id(*log_id),
                BlockSpec::AuthorLog(author, log_id) => {
                    KeyPattern::any().author(author).log_id(*log_id)
                }
            };

            let mut content = clump.content.lock().unwrap();
            let removed = content.match_delete(&pattern)?;
            drop(content);

            if removed > 0 {
                self.invalidate_content_digest(&clump)?;
            }
        }

        Ok(blocks)
    }

    /// Removes a specifier from the clump's block set.
    ///
    /// Removing an absent specifier is a no-op; removing a general block does not remove a more
    /// specific one. Returns the full block list.
    pub fn unblock(&self, spec: &BlockSpec, clump_id: &str) -> Result<Vec<BlockSpec>, EngineError> {
        let spec = self.resolve_spec(spec)?;
        let clump = self.clump(clump_id)?;

        let mut metadata = clump.metadata.lock().unwrap();
        if metadata.remove(&spec)? {
            debug!("Unblocking {} in clump {}", spec, clump_id);
        }

        Ok(metadata.list())
    }

    /// Returns true when exactly this specifier is a member of the clump's block set.
    pub fn is_blocked(&self, spec: &BlockSpec, clump_id: &str) -> Result<bool, EngineError> {
        let spec = self.resolve_spec(spec)?;
        let clump = self.clump(clump_id)?;

        let metadata = clump.metadata.lock().unwrap();
        Ok(metadata.contains(&spec))
    }

    /// Returns true when a stored triple is covered by any member of the block set: its author,
    /// its log id or the exact pair.
    pub fn is_blocked_triple(
        &self,
        triple: &(String, u64, u64),
        clump_id: &str,
    ) -> Result<bool, EngineError> {
        let author = self.resolve_author(&triple.0)?;
        let clump = self.clump(clump_id)?;

        let metadata = clump.metadata.lock().unwrap();
        Ok(metadata.is_blocked(author.as_str(), triple.1))
    }

    /// The clump's full block list, sorted.
    pub fn blocks_list(&self, clump_id: &str) -> Result<Vec<BlockSpec>, EngineError> {
        let clump = self.clump(clump_id)?;
        let metadata = clump.metadata.lock().unwrap();
        Ok(metadata.list())
    }

    /// Keeps the triples which are not covered by the clump's block set, preserving input
    /// order.
    pub fn filter_blocked(
        &self,
        triples: &[(String, u64, u64)],
        clump_id: &str,
    ) -> Result<Vec<(String, u64, u64)>, EngineError> {
        let mut passing = Vec::new();

        for triple in triples {
            if !self.is_blocked_triple(triple, clump_id)? {
                passing.push(triple.clone());
            }
        }

        Ok(passing)
    }

    /// Normalizes author references inside a block specifier to their base62 form.
    fn resolve_spec(&self, spec: &BlockSpec) -> Result<BlockSpec, EngineError> {
        Ok(match spec {
            BlockSpec::Author(reference) => {
                BlockSpec::Author(self.resolve_author(reference)?.as_str().to_owned())
            }
            BlockSpec::LogId(log_id) => BlockSpec::LogId(*log_id),
            BlockSpec::AuthorLog(reference, log_id) => BlockSpec::AuthorLog(
                self.resolve_author(reference)?.as_str().to_owned(),
                *log_id,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use crate::engine::{Baobab, EngineError, Options, DEFAULT_CLUMP};
    use crate::store::BlockSpec;
    use crate::test_utils::fixtures::{append_many, engine};

    #[rstest]
    fn blocking_rejects_local_identities(engine: (TempDir, Baobab)) {
        let (_dir, baobab) = engine;
        let author = baobab.create_identity("testy", None).unwrap();

        let spec = BlockSpec::Author(author.as_str().to_owned());
        assert!(matches!(
            baobab.block(&spec, DEFAULT_CLUMP),
            Err(EngineError::BlockedLocalIdentity)
        ));
        assert!(matches!(
            baobab.block(
                &BlockSpec::AuthorLog(author.as_str().to_owned(), 0),
                DEFAULT_CLUMP
            ),
            Err(EngineError::BlockedLocalIdentity)
        ));

        // Once the identity is dropped the author may be blocked
        baobab.drop_identity("testy").unwrap();
        assert_eq!(baobab.block(&spec, DEFAULT_CLUMP).unwrap().len(), 1);
    }

    #[rstest]
    fn blocking_purges_matching_content(engine: (TempDir, Baobab)) {
        let (_dir, baobab) = engine;
        let author = baobab.create_identity("dude", None).unwrap();
        baobab.create_identity("guy", None).unwrap();

        append_many(&baobab, "dude", 3);
        append_many(&baobab, "guy", 3);

        baobab.drop_identity("dude").unwrap();
        baobab
            .block(&BlockSpec::Author(author.as_str().to_owned()), DEFAULT_CLUMP)
            .unwrap();

        // Only the blocked author's content is gone
        let info = baobab.stored_info(DEFAULT_CLUMP).unwrap();
        assert_eq!(info.len(), 1);
        assert_ne!(info[0].0, author.as_str());

        // And new entries of the blocked author are refused
        assert!(matches!(
            baobab.max_seq_num(author.as_str(), &Options::default()),
            Ok(0)
        ));
    }

    #[rstest]
    fn filtering_follows_the_triple_rule(engine: (TempDir, Baobab)) {
        let (_dir, baobab) = engine;
        let dude = baobab.create_identity("dude", None).unwrap();
        let guy = baobab.create_identity("guy", None).unwrap();

        append_many(&baobab, "dude", 1);
        append_many(&baobab, "guy", 1);

        baobab.drop_identity("dude").unwrap();
        let dude_b62 = dude.as_str().to_owned();
        let guy_b62 = guy.as_str().to_owned();

        baobab
            .block(&BlockSpec::Author(dude_b62.clone()), DEFAULT_CLUMP)
            .unwrap();
        baobab.block(&BlockSpec::LogId(3), DEFAULT_CLUMP).unwrap();
        baobab
            .block(&BlockSpec::AuthorLog(dude_b62.clone(), 2), DEFAULT_CLUMP)
            .unwrap();
        assert_eq!(baobab.blocks_list(DEFAULT_CLUMP).unwrap().len(), 3);

        let triples = vec![
            (guy_b62.clone(), 3, 1),
            (guy_b62.clone(), 3, 2),
            (dude_b62.clone(), 3, 1),
            (dude_b62.clone(), 2, 1),
        ];

        // Everything is covered: log 3 for guy, the author block for dude
        assert!(baobab
            .filter_blocked(&triples, DEFAULT_CLUMP)
            .unwrap()
            .is_empty());

        // Removing the author block leaves dude's pair block and log 3 in place
        baobab
            .unblock(&BlockSpec::Author(dude_b62.clone()), DEFAULT_CLUMP)
            .unwrap();
        assert!(baobab
            .filter_blocked(&triples, DEFAULT_CLUMP)
            .unwrap()
            .is_empty());

        // Removing the pair block frees exactly dude's log 2
        baobab
            .unblock(&BlockSpec::AuthorLog(dude_b62.clone(), 2), DEFAULT_CLUMP)
            .unwrap();
        assert_eq!(
            baobab.filter_blocked(&triples, DEFAULT_CLUMP).unwrap(),
            vec![(dude_b62.clone(), 2, 1)]
        );

        // Removing the log block frees the rest
        baobab.unblock(&BlockSpec::LogId(3), DEFAULT_CLUMP).unwrap();
        assert_eq!(baobab.filter_blocked(&triples, DEFAULT_CLUMP).unwrap(), triples);
    }

    #[rstest]
    fn unblocking_is_narrow(engine: (TempDir, Baobab)) {
        let (_dir, baobab) = engine;
        let author = baobab.create_identity("gone", None).unwrap();
        baobab.drop_identity("gone").unwrap();
        let author_b62 = author.as_str().to_owned();

        baobab
            .block(&BlockSpec::Author(author_b62.clone()), DEFAULT_CLUMP)
            .unwrap();
        baobab
            .block(&BlockSpec::AuthorLog(author_b62.clone(), 2), DEFAULT_CLUMP)
            .unwrap();

        let blocks = baobab
            .unblock(&BlockSpec::Author(author_b62.clone()), DEFAULT_CLUMP)
            .unwrap();
        assert_eq!(blocks, vec![BlockSpec::AuthorLog(author_b62.clone(), 2)]);

        assert!(baobab
            .is_blocked(&BlockSpec::AuthorLog(author_b62, 2), DEFAULT_CLUMP)
            .unwrap());
    }

    #[rstest]
    fn block_set_is_idempotent(engine: (TempDir, Baobab)) {
        let (_dir, baobab) = engine;

        let blocks = baobab.block(&BlockSpec::LogId(3), DEFAULT_CLUMP).unwrap();
        assert_eq!(blocks.len(), 1);
        let blocks = baobab.block(&BlockSpec::LogId(3), DEFAULT_CLUMP).unwrap();
        assert_eq!(blocks.len(), 1);

        // Unblocking an absent specifier is a no-op
        let blocks = baobab.unblock(&BlockSpec::LogId(7), DEFAULT_CLUMP).unwrap();
        assert_eq!(blocks, vec![BlockSpec::LogId(3)]);
    }
}
