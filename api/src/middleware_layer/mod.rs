pub mod gitlab_token;
