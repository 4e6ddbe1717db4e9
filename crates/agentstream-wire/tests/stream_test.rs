use agentstream_wire::{parse_agent_stream, AgentEvent, ChunkStream};
use futures::StreamExt;

fn scripted(chunks: Vec<&'static str>) -> ChunkStream {
    Box::pin(futures::stream::iter(
        chunks.into_iter().map(|c| Ok(c.as_bytes().to_vec())),
    ))
}

async fn collect(chunks: ChunkStream) -> Vec<AgentEvent> {
    parse_agent_stream(chunks)
        .map(|item| item.expect("transport error"))
        .collect()
        .await
}

#[tokio::test]
async fn test_deltas_then_sentinel() {
    let events = collect(scripted(vec![
        "data: {\"type\":\"text-delta\",\"payload\":{\"text\":\"Hello \"}}\n",
        "data: {\"type\":\"text-delta\",\"payload\":{\"text\":\"world\"}}\n",
        "data: [DONE]\n",
    ]))
    .await;

    assert_eq!(
        events,
        vec![
            AgentEvent::ContentDelta {
                text: "Hello ".to_string()
            },
            AgentEvent::ContentDelta {
                text: "world".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_frame_split_across_chunks() {
    let events = collect(scripted(vec![
        "data: {\"type\":\"text-del",
        "ta\",\"payload\":{\"text\":\"ok\"}}\ndata: [DONE]\n",
    ]))
    .await;

    assert_eq!(
        events,
        vec![AgentEvent::ContentDelta {
            text: "ok".to_string()
        }]
    );
}

#[tokio::test]
async fn test_heartbeats_ignored() {
    let events = collect(scripted(vec![
        ": keep-alive\n",
        "data: {\"type\":\"text-delta\",\"payload\":{\"text\":\"x\"}}\n",
        ": keep-alive\n",
    ]))
    .await;

    assert_eq!(
        events,
        vec![AgentEvent::ContentDelta {
            text: "x".to_string()
        }]
    );
}

#[tokio::test]
async fn test_finish_marker_yielded_then_stream_ends() {
    let events = collect(scripted(vec![
        "data: {\"type\":\"finish\"}\n",
        "data: {\"type\":\"text-delta\",\"payload\":{\"text\":\"late\"}}\n",
    ]))
    .await;

    assert_eq!(events, vec![AgentEvent::StreamFinished]);
}

#[tokio::test]
async fn test_transport_error_discards_buffered_partial_frame() {
    // The carry buffer holds a frame that happens to parse on its own, but
    // the stream died before its newline arrived: it may have been cut
    // short, so nothing may follow the error item.
    let chunks: ChunkStream = Box::pin(futures::stream::iter(vec![
        Ok(
            "data: {\"type\":\"text-delta\",\"payload\":{\"text\":\"ok\"}}\ndata: {\"type\":\"text-delta\",\"payload\":{\"text\":\"phantom\"}}"
                .as_bytes()
                .to_vec(),
        ),
        Err(anyhow::anyhow!("connection reset")),
    ]));

    let items: Vec<_> = parse_agent_stream(chunks).collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0].as_ref().unwrap(),
        &AgentEvent::ContentDelta {
            text: "ok".to_string()
        }
    );
    assert!(items[1].is_err());
}

#[tokio::test]
async fn test_final_frame_without_trailing_newline() {
    let events = collect(scripted(vec![
        "data: {\"type\":\"text-delta\",\"payload\":{\"text\":\"tail\"}}",
    ]))
    .await;

    assert_eq!(
        events,
        vec![AgentEvent::ContentDelta {
            text: "tail".to_string()
        }]
    );
}
