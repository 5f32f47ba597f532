//! Label and milestone reconciliation against the destination.
//!
//! Both caches are seeded from the remote once at startup and only grow
//! afterwards, so every label and milestone is created at most once per run
//! and objects created by an interrupted run are reused by the next.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::LabelConfig;
use crate::context::ServiceContext;
use crate::convert::TextConverter;
use crate::error::MigrateError;
use crate::ports::remote::{LabelHandle, MilestoneHandle, MilestoneState, NewMilestone};

/// Owns the label and milestone caches for one run.
pub struct MetadataReconciler<'a> {
    ctx: &'a ServiceContext,
    label_config: &'a LabelConfig,
    default_color: String,
    converter: &'a TextConverter,
    /// Keyed by lower-cased display name.
    labels: HashMap<String, LabelHandle>,
    /// Keyed by exact title.
    milestones: HashMap<String, MilestoneHandle>,
}

impl<'a> MetadataReconciler<'a> {
    /// Creates a reconciler with empty caches.
    ///
    /// Call [`MetadataReconciler::populate`] before resolving anything so that
    /// objects which already exist remotely are not created again.
    #[must_use]
    pub fn new(
        ctx: &'a ServiceContext,
        label_config: &'a LabelConfig,
        default_color: &str,
        converter: &'a TextConverter,
    ) -> Self {
        Self {
            ctx,
            label_config,
            default_color: default_color.trim_start_matches('#').to_string(),
            converter,
            labels: HashMap::new(),
            milestones: HashMap::new(),
        }
    }

    /// Seeds both caches from the labels and milestones that exist remotely.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::RemoteListing`] if either listing fails.
    pub fn populate(&mut self) -> Result<(), MigrateError> {
        let labels = self
            .ctx
            .remote
            .list_labels()
            .map_err(|source| MigrateError::RemoteListing { what: "labels", source })?;
        for label in labels {
            debug!("found label {:?}", label.name);
            self.labels.entry(label_key(&label.name)).or_insert(label);
        }
        info!("found {} labels", self.labels.len());

        let milestones = self
            .ctx
            .remote
            .list_milestones()
            .map_err(|source| MigrateError::RemoteListing { what: "milestones", source })?;
        for milestone in milestones {
            debug!("found milestone {:?}", milestone.title);
            self.milestones.entry(milestone.title.clone()).or_insert(milestone);
        }
        info!("found {} milestones", self.milestones.len());
        Ok(())
    }

    /// Resolves the label configured for `field = value`.
    ///
    /// Returns `Ok(None)` when nothing is configured for the pair. A
    /// configured label missing from the cache is created remotely once.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::LabelCreate`] if remote creation fails.
    pub fn resolve_label(
        &mut self,
        field: &str,
        value: &str,
    ) -> Result<Option<LabelHandle>, MigrateError> {
        let Some(spec) = self.label_config.get(field, value) else {
            return Ok(None);
        };
        let key = label_key(spec.name());
        if let Some(existing) = self.labels.get(&key) {
            debug!("label {:?} cached for {field}={value}", existing.name);
            return Ok(Some(existing.clone()));
        }

        let color = spec.color().map_or(self.default_color.as_str(), |c| c.trim_start_matches('#'));
        let created = self
            .ctx
            .remote
            .create_label(spec.name(), color)
            .map_err(|source| MigrateError::LabelCreate { name: spec.name().to_string(), source })?;
        info!("created label {:?} for {field}={value}", created.name);
        self.labels.insert(key, created.clone());
        Ok(Some(created))
    }

    /// Resolves a milestone by exact name.
    ///
    /// Returns `Ok(None)` for an empty name and for a name the ticket store
    /// does not know; neither blocks the ticket.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::TicketStore`] if the store lookup fails and
    /// [`MigrateError::MilestoneCreate`] if remote creation fails.
    pub fn resolve_milestone(
        &mut self,
        name: &str,
    ) -> Result<Option<MilestoneHandle>, MigrateError> {
        if name.trim().is_empty() {
            return Ok(None);
        }
        if let Some(existing) = self.milestones.get(name) {
            return Ok(Some(existing.clone()));
        }

        let Some(info) = self.ctx.tickets.milestone(name).map_err(MigrateError::TicketStore)?
        else {
            warn!("milestone {name:?} not found in ticket store, leaving unassigned");
            return Ok(None);
        };

        let request = NewMilestone {
            title: info.name.clone(),
            state: if info.completed { MilestoneState::Closed } else { MilestoneState::Open },
            description: self.converter.convert(&info.description),
            due: info.due,
        };
        let created = self
            .ctx
            .remote
            .create_milestone(&request)
            .map_err(|source| MigrateError::MilestoneCreate { name: name.to_string(), source })?;
        info!("created milestone {:?} as #{}", created.title, created.number);
        self.milestones.insert(name.to_string(), created.clone());
        Ok(Some(created))
    }

    /// Number of cached labels.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Number of cached milestones.
    #[must_use]
    pub fn milestone_count(&self) -> usize {
        self.milestones.len()
    }
}

pub(crate) fn label_key(name: &str) -> String {
    name.to_lowercase()
}
