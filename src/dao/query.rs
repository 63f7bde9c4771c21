//! Filtering, sorting and pagination of game listings.

use std::cmp::Ordering;

use crate::{config::PaginationConfig, dao::models::GameEntity};

/// Equality filter on the declared query fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    /// Exact game name.
    pub name: Option<String>,
    /// Role criterion. Games carry no role, so any value matches nothing.
    pub role: Option<String>,
}

impl GameFilter {
    /// Whether `game` passes the filter.
    pub fn matches(&self, game: &GameEntity) -> bool {
        if self.role.is_some() {
            return false;
        }
        match &self.name {
            Some(name) => game.name == *name,
            None => true,
        }
    }
}

/// Fields a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Email,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            "updatedAt" | "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn compare(self, left: &GameEntity, right: &GameEntity) -> Ordering {
        match self {
            Self::Name => left.name.cmp(&right.name),
            Self::Email => left.email.cmp(&right.email),
            Self::CreatedAt => left.created_at.cmp(&right.created_at),
            Self::UpdatedAt => left.updated_at.cmp(&right.updated_at),
        }
    }
}

/// Ordering direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One `field:direction` criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    /// Parse a comma separated `field:(asc|desc)` list. Unknown fields are skipped;
    /// a missing or unknown direction means ascending.
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(',')
            .filter_map(|criterion| {
                let (field, direction) = match criterion.split_once(':') {
                    Some((field, direction)) => (field, direction),
                    None => (criterion, "asc"),
                };
                let field = SortField::parse(field)?;
                let direction = if direction.trim().eq_ignore_ascii_case("desc") {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                };
                Some(Self { field, direction })
            })
            .collect()
    }
}

/// Requested page of a listing, with defaults already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Sort criteria, applied in order; never empty.
    pub sort: Vec<SortKey>,
    /// Page size, at least 1.
    pub limit: u64,
    /// One-based page number.
    pub page: u64,
}

impl PageRequest {
    /// Resolve raw query options. Missing or non-positive values fall back to the
    /// configured page size and to the first page; the default order is oldest first.
    pub fn resolve(
        sort_by: Option<&str>,
        limit: Option<i64>,
        page: Option<i64>,
        config: &PaginationConfig,
    ) -> Self {
        let mut sort = sort_by.map(SortKey::parse_list).unwrap_or_default();
        if sort.is_empty() {
            sort.push(SortKey {
                field: SortField::CreatedAt,
                direction: SortDirection::Asc,
            });
        }

        let limit = limit
            .filter(|limit| *limit > 0)
            .map(|limit| (limit as u64).min(config.max_limit))
            .unwrap_or(config.default_limit)
            .max(1);
        let page = page.filter(|page| *page > 0).unwrap_or(1) as u64;

        Self { sort, limit, page }
    }

    /// Number of entries to skip before this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Compare two games according to the sort criteria.
    pub fn compare(&self, left: &GameEntity, right: &GameEntity) -> Ordering {
        self.sort
            .iter()
            .map(|key| match key.direction {
                SortDirection::Asc => key.field.compare(left, right),
                SortDirection::Desc => key.field.compare(right, left),
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub total_results: u64,
}

impl<T> Page<T> {
    /// Assemble a page from the selected results and the total match count.
    pub fn new(results: Vec<T>, request: &PageRequest, total_results: u64) -> Self {
        Self {
            results,
            page: request.page,
            limit: request.limit,
            total_pages: total_results.div_ceil(request.limit),
            total_results,
        }
    }

    /// Convert every result, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            results: self.results.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

/// Filter, sort and slice a full set of games. Used by stores without a query engine.
pub fn paginate(
    games: impl IntoIterator<Item = GameEntity>,
    filter: &GameFilter,
    request: &PageRequest,
) -> Page<GameEntity> {
    let mut matching = games
        .into_iter()
        .filter(|game| filter.matches(game))
        .collect::<Vec<_>>();
    matching.sort_by(|left, right| request.compare(left, right));

    let total = matching.len() as u64;
    let results = matching
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.limit as usize)
        .collect();

    Page::new(results, request, total)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::dao::models::{GameId, Settings, UserId};

    fn config() -> PaginationConfig {
        PaginationConfig {
            default_limit: 10,
            max_limit: 100,
        }
    }

    fn game(name: &str, age_secs: u64) -> GameEntity {
        let created = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000 - age_secs);
        GameEntity {
            id: GameId::new(),
            revision: 0,
            name: name.into(),
            email: None,
            desc: None,
            owners: vec![UserId::parse("u1").unwrap()],
            settings: Settings::default(),
            badges: Vec::new(),
            missions: Vec::new(),
            players: Vec::new(),
            categories: Vec::new(),
            is_email_verified: false,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn defaults_apply_when_options_are_missing_or_invalid() {
        let request = PageRequest::resolve(None, None, None, &config());
        assert_eq!(request.limit, 10);
        assert_eq!(request.page, 1);
        assert_eq!(
            request.sort,
            vec![SortKey {
                field: SortField::CreatedAt,
                direction: SortDirection::Asc
            }]
        );

        let request = PageRequest::resolve(Some("bogus:desc"), Some(0), Some(-3), &config());
        assert_eq!(request.limit, 10);
        assert_eq!(request.page, 1);
        assert_eq!(request.sort.len(), 1);
    }

    #[test]
    fn limit_is_capped() {
        let request = PageRequest::resolve(None, Some(10_000), None, &config());
        assert_eq!(request.limit, 100);
    }

    #[test]
    fn parses_multiple_sort_criteria() {
        let keys = SortKey::parse_list("name:desc,createdAt");
        assert_eq!(
            keys,
            vec![
                SortKey {
                    field: SortField::Name,
                    direction: SortDirection::Desc
                },
                SortKey {
                    field: SortField::CreatedAt,
                    direction: SortDirection::Asc
                },
            ]
        );
    }

    #[test]
    fn name_filter_counts_only_matches() {
        let games = vec![
            game("Quest", 1),
            game("Quest", 2),
            game("Other", 3),
            game("Quest", 4),
            game("Else", 5),
        ];
        let filter = GameFilter {
            name: Some("Quest".into()),
            role: None,
        };
        let request = PageRequest::resolve(None, Some(10), Some(1), &config());

        let page = paginate(games, &filter, &request);
        assert_eq!(page.total_results, 3);
        assert_eq!(page.results.len(), 3);
        assert_eq!(page.total_pages, 1);
        assert!(page.results.iter().all(|game| game.name == "Quest"));
    }

    #[test]
    fn role_filter_matches_nothing() {
        let filter = GameFilter {
            name: None,
            role: Some("admin".into()),
        };
        let request = PageRequest::resolve(None, None, None, &config());
        let page = paginate(vec![game("a", 1)], &filter, &request);
        assert_eq!(page.total_results, 0);
        assert!(page.results.is_empty());
    }

    #[test]
    fn pages_are_sliced_in_sort_order() {
        let games = (0..5).map(|i| game(&format!("g{i}"), i)).collect::<Vec<_>>();
        let request = PageRequest::resolve(Some("name:desc"), Some(2), Some(2), &config());

        let page = paginate(games, &GameFilter::default(), &request);
        assert_eq!(page.total_results, 5);
        assert_eq!(page.total_pages, 3);
        let names = page
            .results
            .iter()
            .map(|game| game.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["g2", "g1"]);
    }

    #[test]
    fn default_order_is_oldest_first() {
        let games = vec![game("young", 1), game("old", 100)];
        let request = PageRequest::resolve(None, None, None, &config());
        let page = paginate(games, &GameFilter::default(), &request);
        assert_eq!(page.results[0].name, "old");
    }
}
