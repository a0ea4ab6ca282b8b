//! SQL composition for note listing and partial updates.
//!
//! Both builders render a statement with sequential `$n` placeholders and the
//! matching parameter list. Every statement they produce is scoped to one
//! owner: the owner predicate is added at construction and cannot be removed.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::Postgres;
use uuid::Uuid;

use cloudnotes_core::{ListNotesRequest, OwnerId, UpdateNoteRequest};

/// Columns selected for every `Note` row, in struct order.
pub const NOTE_COLUMNS: &str =
    "id, user_id, title, content, file_url, tags, is_pinned, is_archived, created_at, updated_at";

/// Document the full-text filter matches against.
const SEARCH_DOCUMENT: &str = "to_tsvector('english', title || ' ' || coalesce(content, ''))";

/// Newest first, with pinned notes ahead of unpinned ones. `id` breaks ties
/// between notes created in the same instant.
const LIST_ORDER: &str = "is_pinned DESC, created_at DESC, id DESC";

/// Type-safe parameter binding for SQL queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Uuid(Uuid),
    Bool(bool),
    Int(i64),
    String(String),
    /// Bound as `text[]`.
    StringArray(Vec<String>),
    Timestamp(DateTime<Utc>),
}

/// A rendered statement and its parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

/// One predicate in a note listing.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteFilter {
    Owner(Uuid),
    Archived(bool),
    /// Only pinned notes. There is no "only unpinned" filter.
    Pinned,
    /// Tag set contains this exact string.
    Tag(String),
    /// Natural-language full-text query over title and content.
    Search(String),
}

impl NoteFilter {
    /// Render the predicate. `next_param` is the placeholder index to use if
    /// the predicate binds a value.
    fn render(&self, next_param: usize) -> (String, Option<QueryParam>) {
        match self {
            NoteFilter::Owner(id) => (
                format!("user_id = ${}", next_param),
                Some(QueryParam::Uuid(*id)),
            ),
            NoteFilter::Archived(archived) => (
                format!("is_archived = ${}", next_param),
                Some(QueryParam::Bool(*archived)),
            ),
            NoteFilter::Pinned => ("is_pinned = TRUE".to_string(), None),
            NoteFilter::Tag(tag) => (
                format!("tags @> ARRAY[${}]::text[]", next_param),
                Some(QueryParam::String(tag.clone())),
            ),
            NoteFilter::Search(query) => (
                format!(
                    "{} @@ plainto_tsquery('english', ${})",
                    SEARCH_DOCUMENT, next_param
                ),
                Some(QueryParam::String(query.clone())),
            ),
        }
    }
}

/// Builds the `SELECT` behind a note listing.
#[derive(Debug, Clone)]
pub struct NoteListQuery {
    filters: Vec<NoteFilter>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl NoteListQuery {
    /// Start a listing of every note belonging to `owner`.
    pub fn new(owner: OwnerId) -> Self {
        Self {
            filters: vec![NoteFilter::Owner(owner.as_uuid())],
            limit: None,
            offset: None,
        }
    }

    /// Translate a validated listing request.
    pub fn from_request(owner: OwnerId, req: &ListNotesRequest) -> Self {
        let mut query = Self::new(owner).filter(NoteFilter::Archived(req.archived));
        if req.pinned {
            query = query.filter(NoteFilter::Pinned);
        }
        if let Some(tag) = &req.tag {
            query = query.filter(NoteFilter::Tag(tag.clone()));
        }
        if let Some(search) = &req.search {
            query = query.filter(NoteFilter::Search(search.clone()));
        }
        query.paginate(req.limit, req.offset)
    }

    /// Add a predicate. Predicates combine with AND.
    pub fn filter(mut self, filter: NoteFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn paginate(mut self, limit: Option<i64>, offset: Option<i64>) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn filters(&self) -> &[NoteFilter] {
        &self.filters
    }

    pub fn build(&self) -> BuiltQuery {
        let mut clauses = Vec::with_capacity(self.filters.len());
        let mut params = Vec::new();

        for filter in &self.filters {
            let (clause, param) = filter.render(params.len() + 1);
            clauses.push(clause);
            params.extend(param);
        }

        let mut sql = format!(
            "SELECT {} FROM notes WHERE {} ORDER BY {}",
            NOTE_COLUMNS,
            clauses.join(" AND "),
            LIST_ORDER
        );

        if let Some(limit) = self.limit {
            params.push(QueryParam::Int(limit));
            sql.push_str(&format!(" LIMIT ${}", params.len()));
        }
        if let Some(offset) = self.offset {
            params.push(QueryParam::Int(offset));
            sql.push_str(&format!(" OFFSET ${}", params.len()));
        }

        BuiltQuery { sql, params }
    }
}

/// One `SET` entry in a note update.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteAssignment {
    Title(String),
    Content(String),
    Tags(Vec<String>),
    Pinned(bool),
    UpdatedAt(DateTime<Utc>),
}

impl NoteAssignment {
    fn column(&self) -> &'static str {
        match self {
            NoteAssignment::Title(_) => "title",
            NoteAssignment::Content(_) => "content",
            NoteAssignment::Tags(_) => "tags",
            NoteAssignment::Pinned(_) => "is_pinned",
            NoteAssignment::UpdatedAt(_) => "updated_at",
        }
    }

    fn param(&self) -> QueryParam {
        match self {
            NoteAssignment::Title(v) | NoteAssignment::Content(v) => QueryParam::String(v.clone()),
            NoteAssignment::Tags(v) => QueryParam::StringArray(v.clone()),
            NoteAssignment::Pinned(v) => QueryParam::Bool(*v),
            NoteAssignment::UpdatedAt(v) => QueryParam::Timestamp(*v),
        }
    }
}

/// Builds the `UPDATE ... RETURNING` for a partial note update.
#[derive(Debug, Clone)]
pub struct NoteUpdateQuery {
    owner: OwnerId,
    id: Uuid,
    assignments: Vec<NoteAssignment>,
}

impl NoteUpdateQuery {
    /// Translate a validated update request. Title and `updated_at` are always
    /// written; other fields only when present.
    pub fn from_request(
        owner: OwnerId,
        id: Uuid,
        req: UpdateNoteRequest,
        now: DateTime<Utc>,
    ) -> Self {
        let mut assignments = vec![NoteAssignment::Title(req.title)];
        if let Some(content) = req.content {
            assignments.push(NoteAssignment::Content(content));
        }
        if let Some(tags) = req.tags {
            assignments.push(NoteAssignment::Tags(tags));
        }
        if let Some(pinned) = req.is_pinned {
            assignments.push(NoteAssignment::Pinned(pinned));
        }
        assignments.push(NoteAssignment::UpdatedAt(now));

        Self {
            owner,
            id,
            assignments,
        }
    }

    pub fn assignments(&self) -> &[NoteAssignment] {
        &self.assignments
    }

    pub fn build(&self) -> BuiltQuery {
        let mut sets = Vec::with_capacity(self.assignments.len());
        let mut params = Vec::with_capacity(self.assignments.len() + 2);

        for assignment in &self.assignments {
            params.push(assignment.param());
            sets.push(format!("{} = ${}", assignment.column(), params.len()));
        }

        params.push(QueryParam::Uuid(self.id));
        let id_idx = params.len();
        params.push(QueryParam::Uuid(self.owner.as_uuid()));
        let owner_idx = params.len();

        let sql = format!(
            "UPDATE notes SET {} WHERE id = ${} AND user_id = ${} RETURNING {}",
            sets.join(", "),
            id_idx,
            owner_idx,
            NOTE_COLUMNS
        );

        BuiltQuery { sql, params }
    }
}

/// Bind parameters to a typed query in order.
pub(crate) fn bind_params<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &'q [QueryParam],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for param in params {
        query = match param {
            QueryParam::Uuid(id) => query.bind(id),
            QueryParam::Bool(b) => query.bind(b),
            QueryParam::Int(val) => query.bind(val),
            QueryParam::String(s) => query.bind(s),
            QueryParam::StringArray(arr) => query.bind(arr),
            QueryParam::Timestamp(ts) => query.bind(ts),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> OwnerId {
        OwnerId(Uuid::nil())
    }

    #[test]
    fn test_default_listing_is_owner_and_active() {
        let built = NoteListQuery::from_request(owner(), &ListNotesRequest::default()).build();
        assert_eq!(
            built.sql,
            format!(
                "SELECT {} FROM notes WHERE user_id = $1 AND is_archived = $2 \
                 ORDER BY is_pinned DESC, created_at DESC, id DESC",
                NOTE_COLUMNS
            )
        );
        assert_eq!(
            built.params,
            vec![QueryParam::Uuid(Uuid::nil()), QueryParam::Bool(false)]
        );
    }

    #[test]
    fn test_all_filters_number_placeholders_in_order() {
        let req = ListNotesRequest {
            archived: true,
            pinned: true,
            tag: Some("work".to_string()),
            search: Some("quarterly plan".to_string()),
            limit: Some(10),
            offset: Some(20),
        };
        let built = NoteListQuery::from_request(owner(), &req).build();

        assert!(built.sql.contains("user_id = $1"));
        assert!(built.sql.contains("is_archived = $2"));
        assert!(built.sql.contains("is_pinned = TRUE"));
        assert!(built.sql.contains("tags @> ARRAY[$3]::text[]"));
        assert!(built.sql.contains("plainto_tsquery('english', $4)"));
        assert!(built.sql.ends_with("LIMIT $5 OFFSET $6"));
        assert_eq!(
            built.params,
            vec![
                QueryParam::Uuid(Uuid::nil()),
                QueryParam::Bool(true),
                QueryParam::String("work".to_string()),
                QueryParam::String("quarterly plan".to_string()),
                QueryParam::Int(10),
                QueryParam::Int(20),
            ]
        );
    }

    #[test]
    fn test_pinned_filter_binds_nothing() {
        let req = ListNotesRequest {
            pinned: true,
            ..Default::default()
        };
        let built = NoteListQuery::from_request(owner(), &req).build();
        assert_eq!(built.params.len(), 2);
    }

    #[test]
    fn test_offset_without_limit() {
        let req = ListNotesRequest {
            offset: Some(5),
            ..Default::default()
        };
        let built = NoteListQuery::from_request(owner(), &req).build();
        assert!(built.sql.ends_with("OFFSET $3"));
        assert!(!built.sql.contains("LIMIT"));
    }

    #[test]
    fn test_owner_filter_always_first() {
        let query = NoteListQuery::new(owner()).filter(NoteFilter::Pinned);
        assert_eq!(query.filters()[0], NoteFilter::Owner(Uuid::nil()));
    }

    #[test]
    fn test_update_title_only() {
        let now = Utc::now();
        let id = Uuid::now_v7();
        let req = UpdateNoteRequest {
            title: "Renamed".to_string(),
            ..Default::default()
        };
        let built = NoteUpdateQuery::from_request(owner(), id, req, now).build();

        assert_eq!(
            built.sql,
            format!(
                "UPDATE notes SET title = $1, updated_at = $2 WHERE id = $3 AND user_id = $4 RETURNING {}",
                NOTE_COLUMNS
            )
        );
        assert_eq!(
            built.params,
            vec![
                QueryParam::String("Renamed".to_string()),
                QueryParam::Timestamp(now),
                QueryParam::Uuid(id),
                QueryParam::Uuid(Uuid::nil()),
            ]
        );
    }

    #[test]
    fn test_update_all_fields() {
        let req = UpdateNoteRequest {
            title: "T".to_string(),
            content: Some("body".to_string()),
            tags: Some(vec!["a".to_string()]),
            is_pinned: Some(true),
        };
        let query = NoteUpdateQuery::from_request(owner(), Uuid::nil(), req, Utc::now());
        let built = query.build();

        assert_eq!(query.assignments().len(), 5);
        assert!(built.sql.starts_with(
            "UPDATE notes SET title = $1, content = $2, tags = $3, is_pinned = $4, updated_at = $5 \
             WHERE id = $6 AND user_id = $7"
        ));
        assert_eq!(
            built.params[2],
            QueryParam::StringArray(vec!["a".to_string()])
        );
    }

    #[test]
    fn test_update_empty_tag_list_is_written() {
        let req = UpdateNoteRequest {
            title: "T".to_string(),
            tags: Some(vec![]),
            ..Default::default()
        };
        let query = NoteUpdateQuery::from_request(owner(), Uuid::nil(), req, Utc::now());
        assert!(query
            .assignments()
            .contains(&NoteAssignment::Tags(Vec::new())));
    }
}
