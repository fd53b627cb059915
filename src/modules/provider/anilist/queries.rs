//! GraphQL documents sent to AniList.

pub const ANILIST_URL: &str = "https://graphql.anilist.co";

/// Single media lookup by AniList id.
pub const ANIME_QUERY: &str = r#"
query ($id: Int!) {
  Media(id: $id, type: ANIME) {
    id
    idMal
    title { romaji english native }
    season
    seasonYear
    format
    coverImage { extraLarge large medium color }
    synonyms
  }
}
"#;

/// Id-only popularity ranking page, used by the seed driver.
pub const TOP_IDS_QUERY: &str = r#"
query ($page:Int, $perPage:Int) {
  Page(page: $page, perPage: $perPage) {
    pageInfo { hasNextPage }
    media(type: ANIME, sort: POPULARITY_DESC) { id }
  }
}
"#;

pub const TOP_IDS_PAGE_SIZE: usize = 50;
