use super::{
    HttpClient, HttpResponse, MAX_SEARCH_PAGES, PayloadPreview, PlatformAdapter, PublishOutcome,
};
use crate::article::Article;
use crate::markup::ZennMarkup;
use crate::status::Platform;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const HASHNODE_API_URL: &str = "https://gql.hashnode.com";
const PAGE_SIZE: u32 = 20;

const PUBLISH_MUTATION: &str = "\
mutation PublishPost($input: PublishPostInput!) {
  publishPost(input: $input) {
    post {
      id
      slug
      title
      url
    }
  }
}";

const UPDATE_MUTATION: &str = "\
mutation UpdatePost($input: UpdatePostInput!) {
  updatePost(input: $input) {
    post {
      id
      slug
      title
      url
    }
  }
}";

const POSTS_QUERY: &str = "\
query PublicationPosts($id: ObjectId!, $first: Int!, $after: String) {
  publication(id: $id) {
    posts(first: $first, after: $after) {
      edges {
        node {
          id
          title
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}";

/// `PublishPostInput` variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashnodePost {
    pub title: String,
    pub content_markdown: String,
    pub publication_id: String,
    #[serde(rename = "originalArticleURL", skip_serializing_if = "Option::is_none")]
    pub original_article_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePostInput<'a> {
    id: &'a str,
    title: &'a str,
    content_markdown: &'a str,
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Debug, Default, Deserialize)]
struct PostEnvelope {
    #[serde(default)]
    post: Option<PostRef>,
}

#[derive(Debug, Default, Deserialize)]
struct PostRef {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostsConnection {
    #[serde(default)]
    edges: Vec<PostEdge>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct PostEdge {
    node: PostNode,
}

#[derive(Debug, Deserialize)]
struct PostNode {
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    has_next_page: bool,
    #[serde(default)]
    end_cursor: Option<String>,
}

pub struct HashnodeAdapter {
    client: HttpClient,
    token: String,
    publication_id: String,
    endpoint: String,
    markup: ZennMarkup,
}

impl HashnodeAdapter {
    pub fn new(
        client: HttpClient,
        token: impl Into<String>,
        publication_id: impl Into<String>,
        markup: ZennMarkup,
    ) -> Self {
        Self {
            client,
            token: token.into(),
            publication_id: publication_id.into(),
            endpoint: HASHNODE_API_URL.to_string(),
            markup,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn post_graphql<V: Serialize>(&self, query: &str, variables: V) -> Result<Value, String> {
        let request = GraphqlRequest { query, variables };
        let response = self.client.send_json(
            "POST",
            &self.endpoint,
            &[("Authorization", self.token.as_str())],
            &request,
        )?;
        graphql_data(&response)
    }

    fn mutate<V: Serialize>(&self, query: &str, variables: V, field: &str) -> PublishOutcome {
        match self.post_graphql(query, variables) {
            Ok(data) => {
                let envelope: PostEnvelope = data
                    .get(field)
                    .cloned()
                    .and_then(|value| serde_json::from_value(value).ok())
                    .unwrap_or_default();
                PublishOutcome::from_url(
                    Platform::Hashnode,
                    envelope.post.and_then(|post| post.url),
                )
            }
            Err(e) => PublishOutcome::failed(Platform::Hashnode, e),
        }
    }
}

/// GraphQL reports most failures with HTTP 200 and a top-level `errors` array.
fn graphql_data(response: &HttpResponse) -> Result<Value, String> {
    if !response.is_success() {
        return Err(response.describe());
    }
    let body: Value = response.json()?;
    if let Some(errors) = body.get("errors") {
        return Err(errors.to_string());
    }
    Ok(body.get("data").cloned().unwrap_or(Value::Null))
}

impl PlatformAdapter for HashnodeAdapter {
    type Payload = HashnodePost;

    fn platform(&self) -> Platform {
        Platform::Hashnode
    }

    fn convert(&self, article: &Article, canonical_url: Option<&str>) -> HashnodePost {
        HashnodePost {
            title: article.title.clone(),
            content_markdown: self.markup.translate(&article.body),
            publication_id: self.publication_id.clone(),
            original_article_url: canonical_url
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        }
    }

    fn preview(&self, payload: &HashnodePost) -> PayloadPreview {
        PayloadPreview::new(Platform::Hashnode, &payload.title, &payload.content_markdown)
            .field("Publication", payload.publication_id.as_str())
            .canonical(payload.original_article_url.as_deref())
    }

    fn create(&self, payload: &HashnodePost) -> PublishOutcome {
        self.mutate(
            PUBLISH_MUTATION,
            json!({ "input": payload }),
            "publishPost",
        )
    }

    /// `updatePost` only takes the id, title and content.
    fn update(&self, existing_id: &str, payload: &HashnodePost) -> PublishOutcome {
        let input = UpdatePostInput {
            id: existing_id,
            title: &payload.title,
            content_markdown: &payload.content_markdown,
        };
        self.mutate(UPDATE_MUTATION, json!({ "input": input }), "updatePost")
    }

    fn find_existing_by_title(&self, title: &str) -> Option<String> {
        let mut after: Option<String> = None;
        for _ in 0..MAX_SEARCH_PAGES {
            let variables = json!({
                "id": self.publication_id,
                "first": PAGE_SIZE,
                "after": after,
            });
            let data = self.post_graphql(POSTS_QUERY, variables).ok()?;
            let connection: PostsConnection =
                serde_json::from_value(data.get("publication")?.get("posts")?.clone()).ok()?;
            if let Some(edge) = connection
                .edges
                .into_iter()
                .find(|edge| edge.node.title == title)
            {
                return Some(edge.node.id);
            }
            if !connection.page_info.has_next_page {
                return None;
            }
            after = Some(connection.page_info.end_cursor?);
        }
        None
    }
}
