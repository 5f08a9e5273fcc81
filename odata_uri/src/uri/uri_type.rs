//! URI shape classification and per-shape query-option whitelists
//!
//! The resolver assigns exactly one `UriType` per parse, late, and never
//! changes it afterwards. The whitelist owned by each shape is the
//! authoritative gate for system query option validation.

use crate::uri::options::SystemQueryOption;
use serde::Serialize;

/// The legal OData V1/V2 request shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UriType {
    /// Service document (empty path)
    ServiceDocument,
    /// An entity set, e.g. `/Employees`
    EntitySet,
    /// A single entity, e.g. `/Employees('1')`
    Entity,
    /// A complex property of an entity, e.g. `/Employees('1')/Location`
    ComplexProperty,
    /// A simple property of a complex property
    SimplePropertyOfComplex,
    /// A simple property of an entity
    SimpleProperty,
    /// Navigation to a single related entity
    NavigationToOne,
    /// Navigation to a collection of related entities
    NavigationToMany,
    /// `$links` to a single related entity
    LinksToOne,
    /// `$links` to a collection of related entities
    LinksToMany,
    /// `$metadata`
    Metadata,
    /// `$batch`
    Batch,
    /// Function import returning one entity
    FunctionEntity,
    /// Function import returning an entity collection
    FunctionEntityCollection,
    /// Function import returning one complex value
    FunctionComplex,
    /// Function import returning a collection of complex values
    FunctionComplexCollection,
    /// Function import returning one simple value
    FunctionSimple,
    /// Function import returning a collection of simple values
    FunctionSimpleCollection,
    /// `$count` of an entity set or navigation collection
    CountEntitySet,
    /// `$count` of a single entity
    CountEntity,
    /// `$value` of a media-linked entity
    MediaValue,
    /// `$count` of `$links` to a single entity
    CountLinksToOne,
    /// `$count` of `$links` to a collection
    CountLinksToMany,
}

impl UriType {
    /// The system query options this shape accepts
    pub fn whitelist(&self) -> &'static [SystemQueryOption] {
        use SystemQueryOption::*;
        match self {
            Self::ServiceDocument => &[Format],
            Self::EntitySet => &[
                Format, Filter, InlineCount, OrderBy, SkipToken, Skip, Top, Expand, Select,
            ],
            Self::Entity => &[Format, Expand, Select],
            Self::ComplexProperty => &[Format],
            Self::SimplePropertyOfComplex => &[Format],
            Self::SimpleProperty => &[Format],
            Self::NavigationToOne => &[Format, Expand, Select],
            Self::NavigationToMany => &[
                Format, Filter, InlineCount, OrderBy, SkipToken, Skip, Top, Expand, Select,
            ],
            Self::LinksToOne => &[Format],
            Self::LinksToMany => &[Format, Skip, Top, InlineCount, SkipToken],
            Self::Metadata => &[],
            Self::Batch => &[],
            Self::FunctionEntity => &[Format],
            Self::FunctionEntityCollection => &[
                Format, Filter, InlineCount, OrderBy, SkipToken, Skip, Top,
            ],
            Self::FunctionComplex => &[Format],
            Self::FunctionComplexCollection => &[Format, Skip, Top],
            Self::FunctionSimple => &[Format],
            Self::FunctionSimpleCollection => &[Format, Skip, Top],
            Self::CountEntitySet => &[Filter, OrderBy, Skip, Top],
            Self::CountEntity => &[],
            Self::MediaValue => &[],
            Self::CountLinksToOne => &[],
            Self::CountLinksToMany => &[Skip, Top],
        }
    }

    /// Whitelist membership check used by the option validator
    pub fn is_compatible(&self, option: SystemQueryOption) -> bool {
        self.whitelist().contains(&option)
    }

    /// Shapes whose `$value` flag makes `$format` illegal even though it is
    /// in the whitelist
    pub fn is_raw_value_candidate(&self) -> bool {
        matches!(self, Self::SimplePropertyOfComplex | Self::SimpleProperty)
    }

    /// All variants, for exhaustive table tests
    pub fn all() -> &'static [UriType] {
        &[
            Self::ServiceDocument,
            Self::EntitySet,
            Self::Entity,
            Self::ComplexProperty,
            Self::SimplePropertyOfComplex,
            Self::SimpleProperty,
            Self::NavigationToOne,
            Self::NavigationToMany,
            Self::LinksToOne,
            Self::LinksToMany,
            Self::Metadata,
            Self::Batch,
            Self::FunctionEntity,
            Self::FunctionEntityCollection,
            Self::FunctionComplex,
            Self::FunctionComplexCollection,
            Self::FunctionSimple,
            Self::FunctionSimpleCollection,
            Self::CountEntitySet,
            Self::CountEntity,
            Self::MediaValue,
            Self::CountLinksToOne,
            Self::CountLinksToMany,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SystemQueryOption::*;

    #[test]
    fn test_entity_set_accepts_paging() {
        assert!(UriType::EntitySet.is_compatible(Filter));
        assert!(UriType::EntitySet.is_compatible(Top));
        assert!(UriType::EntitySet.is_compatible(SkipToken));
        assert!(UriType::EntitySet.is_compatible(Select));
    }

    #[test]
    fn test_single_entity_rejects_paging() {
        assert!(UriType::Entity.is_compatible(Expand));
        assert!(!UriType::Entity.is_compatible(Filter));
        assert!(!UriType::Entity.is_compatible(Top));
        assert!(!UriType::Entity.is_compatible(SkipToken));
    }

    #[test]
    fn test_metadata_and_batch_accept_nothing() {
        for option in [
            Format, Filter, InlineCount, OrderBy, SkipToken, Skip, Top, Expand, Select,
        ] {
            assert!(!UriType::Metadata.is_compatible(option));
            assert!(!UriType::Batch.is_compatible(option));
        }
    }

    #[test]
    fn test_count_shapes() {
        assert!(UriType::CountEntitySet.is_compatible(Filter));
        assert!(!UriType::CountEntitySet.is_compatible(Format));
        assert!(!UriType::CountEntity.is_compatible(Format));
        assert!(UriType::CountLinksToMany.is_compatible(Top));
        assert!(!UriType::CountLinksToOne.is_compatible(Top));
    }

    #[test]
    fn test_raw_value_candidates() {
        assert!(UriType::SimpleProperty.is_raw_value_candidate());
        assert!(UriType::SimplePropertyOfComplex.is_raw_value_candidate());
        assert!(!UriType::MediaValue.is_raw_value_candidate());
        assert!(!UriType::Entity.is_raw_value_candidate());
    }

    #[test]
    fn test_all_lists_every_variant_once() {
        let all = UriType::all();
        assert_eq!(all.len(), 23);
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
