// End-to-end tests for the ArticleCast HTTP API
//
// Each test gets its own server bound to an ephemeral port, a wiremock server
// standing in for the speech and language model providers, and temporary
// output and cache directories. Audio assembly is replaced by a byte joiner
// so the order of segments can be read back from the response body.

mod helpers;
mod test_episodes;
mod test_health;
mod test_tts;
