//! Attribute Vector Assembler
//!
//! Turns a labelled changeset list into an `AttributeTable`:
//! dedupe by id -> load -> sample -> blocklist -> one row per sample.
//!
//! Row order is changeset order (after deduplication) times sample order.

use std::collections::HashSet;

use serde::Serialize;

use crate::logic::changeset::{Action, ChangesetSource, GeometryKind, Sample, Sampler};
use crate::logic::config::{AttributeSchema, ExtractorConfig};
use crate::logic::dataset::{AttributeTable, LabelledChangeset};
use crate::logic::features::primary_tags::{self, primary_tag_column, PRIMARY_TAGS};
use crate::logic::features::{accessor, diff, geometry};
use crate::logic::features::{AttributeRow, AttributeRowBuilder, AttributeValue, ChangedTagsEncoder, TagEncoder};
use crate::logic::users::UserDetailsSource;

static DEFAULT_TAG_ENCODER: ChangedTagsEncoder = ChangedTagsEncoder;

/// Counters of one extraction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    /// Distinct changeset ids processed
    pub changesets: usize,
    /// Repeated ids skipped
    pub duplicates: usize,
    /// Changesets whose archive could not be loaded
    pub missing: usize,
    /// Samples produced by the sampler
    pub samples: usize,
    /// Samples dropped by the user blocklist
    pub blocked: usize,
    pub rows: usize,
}

/// Assembles attribute rows from its collaborators.
///
/// Holds no state between runs; the seen-changeset set lives inside
/// `extract_with_summary`.
pub struct AttributeAssembler<'a> {
    config: ExtractorConfig,
    changesets: &'a dyn ChangesetSource,
    sampler: &'a dyn Sampler,
    users: &'a dyn UserDetailsSource,
    tags: &'a dyn TagEncoder,
}

impl<'a> AttributeAssembler<'a> {
    pub fn new(
        config: ExtractorConfig,
        changesets: &'a dyn ChangesetSource,
        sampler: &'a dyn Sampler,
        users: &'a dyn UserDetailsSource,
    ) -> Self {
        Self {
            config,
            changesets,
            sampler,
            users,
            tags: &DEFAULT_TAG_ENCODER,
        }
    }

    /// Replace the default `ChangedTagsEncoder`
    pub fn with_tag_encoder(mut self, tags: &'a dyn TagEncoder) -> Self {
        self.tags = tags;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn extract(&self, list: &[LabelledChangeset]) -> AttributeTable {
        self.extract_with_summary(list).0
    }

    pub fn extract_with_summary(&self, list: &[LabelledChangeset]) -> (AttributeTable, ExtractionSummary) {
        let mut table = AttributeTable::new(self.config.schema);
        let mut summary = ExtractionSummary::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for labelled in list {
            // First occurrence wins, whether or not it loads
            if !seen.insert(labelled.id.as_str()) {
                log::debug!("Skipping duplicate changeset {}", labelled.id);
                summary.duplicates += 1;
                continue;
            }
            summary.changesets += 1;

            let Some(changeset) = self.changesets.load(&labelled.id) else {
                log::debug!("Skipping changeset {}: archive not available", labelled.id);
                summary.missing += 1;
                continue;
            };

            for sample in self.sampler.samples(&changeset) {
                summary.samples += 1;

                let Some(row) = self.assemble_row(labelled, &sample) else {
                    summary.blocked += 1;
                    continue;
                };
                match table.push(row) {
                    Ok(()) => summary.rows += 1,
                    Err(e) => log::warn!("Dropping row of changeset {}: {}", labelled.id, e),
                }
            }
        }

        log::info!(
            "Extracted {} rows from {} changesets ({} duplicates, {} missing, {} blocked samples)",
            summary.rows,
            summary.changesets,
            summary.duplicates,
            summary.missing,
            summary.blocked
        );

        (table, summary)
    }

    /// One row for one sample, or `None` when either version's user is blocked
    pub fn assemble_row(&self, labelled: &LabelledChangeset, sample: &Sample) -> Option<AttributeRow> {
        let new = Some(sample.new_version());
        let old = sample.old_version();

        let new_username = accessor::username(new);
        let old_username = accessor::username(old);
        if self.config.is_blocked(&new_username) || self.config.is_blocked(&old_username) {
            log::debug!(
                "Skipping feature {} of changeset {}: blocked user",
                accessor::feature_id(new),
                labelled.id
            );
            return None;
        }

        let new_user = self.users.user_details(&new_username);
        let old_user = self.users.user_details(&old_username);

        let metric = self.config.metric;
        let action = accessor::action_kind(new);
        let kind = accessor::geometry_kind_of(new);
        let old_tag_count = accessor::number_of_tags(old);
        let new_tag_count = accessor::number_of_tags(new);

        let mut builder = AttributeRowBuilder::new(self.config.schema)
            .set("changeset_id", labelled.id.as_str())
            .set("changeset_harmful", labelled.harmful.cell())
            .set("feature_id", accessor::feature_id(new))
            .set("feature_version", accessor::feature_version(new))
            .set("action_create", AttributeValue::flag(action == Some(Action::Create)))
            .set("action_modify", AttributeValue::flag(action == Some(Action::Modify)))
            .set("action_delete", AttributeValue::flag(action == Some(Action::Delete)))
            .set("geometry_type_node", AttributeValue::flag(kind == Some(GeometryKind::Node)))
            .set("geometry_type_way", AttributeValue::flag(kind == Some(GeometryKind::Way)))
            .set("geometry_type_relation", AttributeValue::flag(kind == Some(GeometryKind::Relation)))
            .set("geometry_distance_between_versions", diff::centroid_distance(new, old, metric))
            .set("old_geometry_line_distance", geometry::line_length(old, metric))
            .set("old_geometry_number_of_nodes", geometry::node_count(old))
            .set("old_geometry_kinks", geometry::self_intersections(old).len())
            .set("old_geometry_area", geometry::area(old, metric))
            .set("new_geometry_line_distance", geometry::line_length(new, metric))
            .set("new_geometry_number_of_nodes", geometry::node_count(new))
            .set("new_geometry_kinks", geometry::self_intersections(new).len())
            .set("new_geometry_area", geometry::area(new, metric))
            .set("old_user_mapping_days", old_user.mapping_days())
            .set("new_user_mapping_days", new_user.mapping_days())
            .set("difference_user_mapping_days", diff::mapping_days_delta(&new_user, &old_user))
            .set("ratio_user_mapping_days", diff::mapping_days_ratio(&new_user, &old_user))
            .set("old_number_of_tags", old_tag_count)
            .set("new_number_of_tags", new_tag_count)
            .set("difference_number_of_tags", diff::tag_count_delta(new, old))
            .set("ratio_number_of_tags", diff::tag_count_ratio(new, old))
            .set("old_tags", self.tags.encode(old, new))
            .set("new_tags", self.tags.encode(new, old));

        if self.config.schema == AttributeSchema::Extended {
            builder = builder
                .set("old_geometry_bbox_area", geometry::bbox_area(old, metric))
                .set("new_geometry_bbox_area", geometry::bbox_area(new, metric))
                .set("old_geometry_longest_segment", geometry::longest_segment_length(old, metric))
                .set("new_geometry_longest_segment", geometry::longest_segment_length(new, metric))
                .set("name_modified", diff::name_changed(new, old))
                .set("name_touched", diff::name_touched(new, old))
                .set("new_primary_tag_count", primary_tags::primary_tag_count(new));

            let flags = primary_tags::primary_tag_vector(new);
            for (key, flag) in PRIMARY_TAGS.iter().zip(flags) {
                builder = builder.set(&primary_tag_column(key), flag);
            }
        }

        Some(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::changeset::{Changeset, FeatureVersion, InMemoryChangesets, TagSampler};
    use crate::logic::config::MetricSpace;
    use crate::logic::dataset::Harmful;
    use crate::logic::users::{InMemoryUserDetails, UserDetails};
    use serde_json::{json, Value};

    fn version(id: u64, version: u64, action: &str, user: &str, tags: Value) -> FeatureVersion {
        FeatureVersion::from_json(&json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [3.0, 4.0], [6.0, 8.0]] },
            "properties": {
                "id": id, "version": version, "type": "way", "action": action,
                "user": user, "tags": tags
            }
        }))
    }

    fn highway_changeset(id: &str, user: &str) -> Changeset {
        Changeset::from_versions(
            id,
            vec![
                version(10, 1, "create", "old_mapper", json!({ "highway": "residential" })),
                version(10, 2, "modify", user, json!({ "highway": "residential", "name": "Main St" })),
            ],
        )
    }

    fn labelled(id: &str, harmful: Harmful) -> LabelledChangeset {
        LabelledChangeset::new(id, harmful)
    }

    fn users() -> InMemoryUserDetails {
        let mut users = InMemoryUserDetails::new();
        users.insert("old_mapper", UserDetails::with_mapping_days(100));
        users.insert("new_mapper", UserDetails::with_mapping_days(50));
        users
    }

    #[test]
    fn test_row_for_modified_way() {
        let changesets: InMemoryChangesets = vec![highway_changeset("1", "new_mapper")].into_iter().collect();
        let sampler = TagSampler::highway();
        let users = users();
        let config = ExtractorConfig::default().with_metric(MetricSpace::Planar);
        let assembler = AttributeAssembler::new(config, &changesets, &sampler, &users);

        let table = assembler.extract(&[labelled("1", Harmful::Harmful)]);
        assert_eq!(table.len(), 1);

        let row = &table.rows()[0];
        let cell = |name: &str| row.get_by_name(name).cloned().unwrap();
        assert_eq!(cell("changeset_id"), AttributeValue::Text("1".into()));
        assert_eq!(cell("changeset_harmful"), AttributeValue::Int(1));
        assert_eq!(cell("feature_id"), AttributeValue::Text("10".into()));
        assert_eq!(cell("feature_version"), AttributeValue::Int(2));
        assert_eq!(cell("action_modify"), AttributeValue::Int(1));
        assert_eq!(cell("geometry_type_way"), AttributeValue::Int(1));
        assert_eq!(cell("geometry_distance_between_versions"), AttributeValue::Float(0.0));
        assert_eq!(cell("old_geometry_line_distance"), AttributeValue::Float(10.0));
        assert_eq!(cell("old_user_mapping_days"), AttributeValue::Int(100));
        assert_eq!(cell("new_user_mapping_days"), AttributeValue::Int(50));
        assert_eq!(cell("difference_user_mapping_days"), AttributeValue::Int(-50));
        assert_eq!(cell("ratio_user_mapping_days"), AttributeValue::Float(0.5));
        assert_eq!(cell("ratio_number_of_tags"), AttributeValue::Float(2.0));
        assert_eq!(cell("old_tags"), AttributeValue::Text(String::new()));
        assert_eq!(cell("new_tags"), AttributeValue::Text("name=Main St".into()));
    }

    #[test]
    fn test_duplicates_and_missing_changesets() {
        let changesets: InMemoryChangesets = vec![
            highway_changeset("1", "new_mapper"),
            highway_changeset("3", "new_mapper"),
        ]
        .into_iter()
        .collect();
        let sampler = TagSampler::highway();
        let users = users();
        let assembler = AttributeAssembler::new(ExtractorConfig::default(), &changesets, &sampler, &users);

        let list = [
            labelled("1", Harmful::Harmful),
            labelled("1", Harmful::Benign),
            labelled("2", Harmful::Benign),
            labelled("2", Harmful::Benign),
            labelled("3", Harmful::Unknown),
        ];
        let (table, summary) = assembler.extract_with_summary(&list);

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get_by_name("changeset_harmful"), Some(&AttributeValue::Int(1)));
        assert_eq!(table.rows()[1].get_by_name("changeset_harmful"), Some(&AttributeValue::Blank));
        assert_eq!(
            summary,
            ExtractionSummary {
                changesets: 3,
                duplicates: 2,
                missing: 1,
                samples: 2,
                blocked: 0,
                rows: 2,
            }
        );
    }

    #[test]
    fn test_blocked_users_emit_no_row() {
        let changesets: InMemoryChangesets = vec![
            highway_changeset("1", "chinakz"),
            highway_changeset("2", "new_mapper"),
        ]
        .into_iter()
        .collect();
        let sampler = TagSampler::highway();
        let users = users();
        let assembler = AttributeAssembler::new(ExtractorConfig::default(), &changesets, &sampler, &users);

        let (table, summary) =
            assembler.extract_with_summary(&[labelled("1", Harmful::Harmful), labelled("2", Harmful::Benign)]);
        assert_eq!(table.len(), 1);
        assert_eq!(summary.blocked, 1);
        assert_eq!(table.rows()[0].get_by_name("changeset_id"), Some(&AttributeValue::Text("2".into())));

        // Blocking the previous editor drops the sample as well
        let config = ExtractorConfig::default().with_blocked_users(["old_mapper"]);
        let assembler = AttributeAssembler::new(config, &changesets, &sampler, &users);
        assert!(assembler.extract(&[labelled("2", Harmful::Benign)]).is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let changesets: InMemoryChangesets = (1..=5)
            .map(|i| highway_changeset(&i.to_string(), "new_mapper"))
            .collect();
        let sampler = TagSampler::highway();
        let users = users();
        let assembler = AttributeAssembler::new(ExtractorConfig::default(), &changesets, &sampler, &users);
        let list: Vec<_> = (1..=5).rev().map(|i| labelled(&i.to_string(), Harmful::Benign)).collect();

        let first = assembler.extract(&list).to_csv();
        let second = assembler.extract(&list).to_csv();
        assert_eq!(first, second);

        let ids: Vec<String> = assembler
            .extract(&list)
            .rows()
            .iter()
            .filter_map(|r| r.get_by_name("changeset_id").map(ToString::to_string))
            .collect();
        assert_eq!(ids, vec!["5", "4", "3", "2", "1"]);
    }

    #[test]
    fn test_extended_schema_columns() {
        let changesets: InMemoryChangesets = vec![highway_changeset("1", "new_mapper")].into_iter().collect();
        let sampler = TagSampler::highway();
        let users = users();
        let config = ExtractorConfig::default()
            .with_metric(MetricSpace::Planar)
            .with_schema(AttributeSchema::Extended);
        let assembler = AttributeAssembler::new(config, &changesets, &sampler, &users);

        let table = assembler.extract(&[labelled("1", Harmful::Benign)]);
        let row = &table.rows()[0];
        assert!(row.is_compatible());
        assert_eq!(row.get_by_name("name_modified"), Some(&AttributeValue::Int(1)));
        assert_eq!(row.get_by_name("name_touched"), Some(&AttributeValue::Int(1)));
        assert_eq!(row.get_by_name("new_geometry_longest_segment"), Some(&AttributeValue::Float(5.0)));
        assert_eq!(row.get_by_name("new_geometry_bbox_area"), Some(&AttributeValue::Float(48.0)));
        assert_eq!(row.get_by_name("new_primary_tag_count"), Some(&AttributeValue::Int(1)));
        assert_eq!(row.get_by_name("primary_tag_highway"), Some(&AttributeValue::Int(1)));
        assert_eq!(row.get_by_name("primary_tag_building"), Some(&AttributeValue::Int(0)));
        assert!(row.values.iter().all(|v| !v.is_blank()));
    }

    struct NoTags;

    impl TagEncoder for NoTags {
        fn encode(&self, _: Option<&FeatureVersion>, _: Option<&FeatureVersion>) -> String {
            "-".to_string()
        }
    }

    #[test]
    fn test_custom_tag_encoder() {
        let changesets: InMemoryChangesets = vec![highway_changeset("1", "new_mapper")].into_iter().collect();
        let sampler = TagSampler::highway();
        let users = users();
        let encoder = NoTags;
        let assembler = AttributeAssembler::new(ExtractorConfig::default(), &changesets, &sampler, &users)
            .with_tag_encoder(&encoder);

        let table = assembler.extract(&[labelled("1", Harmful::Benign)]);
        assert_eq!(table.rows()[0].get_by_name("new_tags"), Some(&AttributeValue::Text("-".into())));
    }
}
