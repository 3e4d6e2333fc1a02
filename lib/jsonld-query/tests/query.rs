#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use itertools::Itertools;
use jsonld_query::context::{ActiveContext, ContextNormalizer, InlineContextNormalizer};
use jsonld_query::execution::MemorySource;
use jsonld_query::model::QuerySolution;
use jsonld_query::results::ResultError;
use jsonld_query::{Parser, QueryError, QueryOptions, compile, query, query_opt};
use oxrdfio::RdfFormat;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::{Value as JsonValue, json};
use std::error::Error;
use std::sync::Arc;

const DATA: &str = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix co: <http://purl.org/co/> .

<ex:1> <ex:hair_color> "blond" ;
    <ex:eye_color> "blue" ;
    <ex:age> 42 ;
    <ex:views> 10000000000000000000 ;
    <ex:born> "2020-01-01"^^<http://www.w3.org/2001/XMLSchema#date> ;
    <ex:steps> ( "a" "b" "c" ) .

<ex:2> <ex:hair_color> "red" ;
    <ex:eye_color> "green" ;
    <ex:friends> <ex:1> , <ex:3> ;
    <ex:steps> () .

<ex:3> <ex:hair_color> "brown" .

<ex:4> <ex:steps> _:n0 .
_:n0 rdf:first "a" ;
    rdf:rest _:n1 .
_:n1 rdf:first "b" .

<ex:5> <ex:steps> _:list .
_:list co:item _:s1 , _:s2 .
_:s1 co:index 2 ;
    co:itemContent "second" .
_:s2 co:index 1 ;
    co:itemContent "first" .
"#;

fn source() -> Result<MemorySource, Box<dyn Error>> {
    let mut source = MemorySource::new();
    source.load_from_reader(RdfFormat::Turtle, DATA.as_bytes())?;
    Ok(source)
}

/// Sorts all arrays, so that results can be compared regardless of the order of set members.
fn canonical(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Array(items) => {
            let mut items = items.into_iter().map(canonical).collect::<Vec<_>>();
            items.sort_by_key(JsonValue::to_string);
            JsonValue::Array(items)
        }
        JsonValue::Object(map) => map
            .into_iter()
            .map(|(key, value)| (key, canonical(value)))
            .collect(),
        value => value,
    }
}

#[tokio::test]
async fn fills_in_placeholders() -> Result<(), Box<dyn Error>> {
    let response = query(
        &source()?,
        &json!({"@id": "ex:1", "ex:hair_color": "?", "ex:eye_color": "?"}),
    )
    .await?;

    assert_eq!(
        serde_json::to_value(&response)?,
        json!({
            "data": {"@id": "ex:1", "ex:hair_color": "blond", "ex:eye_color": "blue"},
            "warnings": []
        })
    );
    Ok(())
}

#[tokio::test]
async fn arrays_match_all_nodes() -> Result<(), Box<dyn Error>> {
    let response = query(
        &source()?,
        &json!([{"@id": "?", "ex:hair_color": "?", "ex:eye_color": "?"}]),
    )
    .await?;

    assert_eq!(
        canonical(response.data.ok_or("no data")?),
        canonical(json!([
            {"@id": "ex:1", "ex:hair_color": "blond", "ex:eye_color": "blue"},
            {"@id": "ex:2", "ex:hair_color": "red", "ex:eye_color": "green"}
        ]))
    );
    Ok(())
}

#[tokio::test]
async fn templates_without_identity() -> Result<(), Box<dyn Error>> {
    let mut source = MemorySource::new();
    source.load_from_reader(
        RdfFormat::Turtle,
        r#"
        <ex:a> <ex:eye_color> "blue" ; <ex:name> "Alice" .
        <ex:b> <ex:eye_color> "blue" ; <ex:name> "Bob" .
        <ex:c> <ex:eye_color> "green" ; <ex:name> "Carol" .
        "#
        .as_bytes(),
    )?;

    let response = query(&source, &json!([{"ex:eye_color": "blue", "ex:name": "?"}])).await?;
    assert_eq!(
        canonical(response.data.ok_or("no data")?),
        canonical(json!([
            {"ex:eye_color": "blue", "ex:name": "Alice"},
            {"ex:eye_color": "blue", "ex:name": "Bob"}
        ]))
    );
    assert!(response.warnings.is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_data_yields_null() -> Result<(), Box<dyn Error>> {
    let response = query(&source()?, &json!({"@id": "ex:3", "ex:eye_color": "?"})).await?;
    assert_eq!(response.data, None);
    assert_eq!(
        serde_json::to_value(&response)?,
        json!({"data": null, "warnings": []})
    );
    Ok(())
}

#[tokio::test]
async fn sets_without_members_are_empty() -> Result<(), Box<dyn Error>> {
    let source = source()?;
    let document = |id: &str| json!({"@id": id, "ex:hair_color": "?", "ex:friends": [{"@id": "?", "ex:hair_color": "?"}]});

    let response = query(&source, &document("ex:1")).await?;
    assert_eq!(
        response.data,
        Some(json!({"@id": "ex:1", "ex:hair_color": "blond", "ex:friends": []}))
    );

    let response = query(&source, &document("ex:2")).await?;
    assert_eq!(
        canonical(response.data.ok_or("no data")?),
        canonical(json!({
            "@id": "ex:2",
            "ex:hair_color": "red",
            "ex:friends": [
                {"@id": "ex:1", "ex:hair_color": "blond"},
                {"@id": "ex:3", "ex:hair_color": "brown"}
            ]
        }))
    );
    Ok(())
}

#[tokio::test]
async fn native_values_are_decoded() -> Result<(), Box<dyn Error>> {
    let response = query(&source()?, &json!({"@id": "ex:1", "ex:age": "?"})).await?;
    assert_eq!(response.data, Some(json!({"@id": "ex:1", "ex:age": 42})));

    let error = query(&source()?, &json!({"@id": "ex:2", "ex:friends": "?"}))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        QueryError::Result(ResultError::BadNativeValue { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn large_integers_are_decoded() -> Result<(), Box<dyn Error>> {
    let source = source()?;
    let response = query(&source, &json!({"@id": "ex:1", "ex:views": "?"})).await?;
    assert_eq!(
        response.data,
        Some(json!({"@id": "ex:1", "ex:views": 10_000_000_000_000_000_000_u64}))
    );

    let document = json!({"@id": "ex:1", "ex:views": 10_000_000_000_000_000_000_u64});
    let response = query(&source, &document).await?;
    assert_eq!(response.data, Some(document));
    Ok(())
}

#[tokio::test]
async fn datatype_coercion_fills_in_lexical_forms() -> Result<(), Box<dyn Error>> {
    let source = source()?;
    let document = |born: &str| {
        json!({
            "@context": {
                "born": {"@id": "ex:born", "@type": "http://www.w3.org/2001/XMLSchema#date"}
            },
            "@id": "ex:1",
            "born": born
        })
    };

    let response = query(&source, &document("?")).await?;
    assert_eq!(response.data, Some(document("2020-01-01")));

    let response = query(&source, &document("2020-01-01")).await?;
    assert_eq!(response.data, Some(document("2020-01-01")));

    let error = query(
        &source,
        &json!({
            "@context": {
                "hair": {"@id": "ex:hair_color", "@type": "http://www.w3.org/2001/XMLSchema#date"}
            },
            "@id": "ex:1",
            "hair": "?"
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        error,
        QueryError::Result(ResultError::BadNativeValue { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn linked_lists_keep_their_order() -> Result<(), Box<dyn Error>> {
    let source = source()?;
    let response = query(&source, &json!({"@id": "ex:1", "ex:steps": {"@list": ["?"]}})).await?;
    assert_eq!(
        response.data,
        Some(json!({"@id": "ex:1", "ex:steps": {"@list": ["a", "b", "c"]}}))
    );

    let response = query(&source, &json!({"@id": "ex:2", "ex:steps": {"@list": ["?"]}})).await?;
    assert_eq!(
        response.data,
        Some(json!({"@id": "ex:2", "ex:steps": {"@list": []}}))
    );
    Ok(())
}

#[tokio::test]
async fn list_containers_are_unwrapped() -> Result<(), Box<dyn Error>> {
    let response = query(
        &source()?,
        &json!({
            "@context": {"steps": {"@id": "ex:steps", "@container": "@list"}},
            "@id": "ex:1",
            "steps": ["?"]
        }),
    )
    .await?;
    assert_eq!(response.data.ok_or("no data")?["steps"], json!(["a", "b", "c"]));
    Ok(())
}

#[tokio::test]
async fn broken_lists_are_errors() -> Result<(), Box<dyn Error>> {
    let error = query(
        &source()?,
        &json!({"@id": "ex:4", "ex:steps": {"@list": ["?"]}}),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        error,
        QueryError::Result(ResultError::BrokenChain { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn indexed_lists() -> Result<(), Box<dyn Error>> {
    let options = QueryOptions::default().with_parser(Parser::with_indexed_lists());
    let response = query_opt(
        &source()?,
        &json!({"@id": "ex:5", "ex:steps": {"@list": ["?"]}}),
        &options,
    )
    .await?;
    assert_eq!(
        response.data,
        Some(json!({"@id": "ex:5", "ex:steps": {"@list": ["first", "second"]}}))
    );
    Ok(())
}

#[tokio::test]
async fn unknown_keys_are_echoed() -> Result<(), Box<dyn Error>> {
    let response = query(&source()?, &json!({"bogus": "x"})).await?;
    assert_eq!(
        serde_json::to_value(&response)?,
        json!({
            "data": {"bogus": "x"},
            "warnings": [{
                "message": "The key 'bogus' is not defined in the context",
                "path": ["bogus"]
            }]
        })
    );
    Ok(())
}

#[tokio::test]
async fn constant_queries_round_trip() -> Result<(), Box<dyn Error>> {
    let document = json!({
        "@id": "ex:2",
        "ex:hair_color": "red",
        "ex:friends": [{"@id": "ex:3", "ex:hair_color": "brown"}]
    });

    let response = query(&source()?, &document).await?;
    assert_eq!(response.data, Some(document));
    Ok(())
}

#[tokio::test]
async fn initial_context() -> Result<(), Box<dyn Error>> {
    let context = InlineContextNormalizer.normalize(
        &json!({"@vocab": "ex:", "@base": "ex:"}),
        &ActiveContext::new(),
    )?;
    let options = QueryOptions::default().with_context(Arc::new(context));

    let response = query_opt(
        &source()?,
        &json!([{"@id": "?", "eye_color": "?"}]),
        &options,
    )
    .await?;
    assert_eq!(
        canonical(response.data.ok_or("no data")?),
        canonical(json!([
            {"@id": "1", "eye_color": "blue"},
            {"@id": "2", "eye_color": "green"}
        ]))
    );
    Ok(())
}

#[tokio::test]
async fn malformed_queries_fail() -> Result<(), Box<dyn Error>> {
    let error = query(&source()?, &json!({"ex:friends": [{}, {}]}))
        .await
        .unwrap_err();
    assert!(matches!(error, QueryError::Compile(_)));
    Ok(())
}

#[test]
fn solution_order_does_not_matter() -> Result<(), Box<dyn Error>> {
    let source = source()?;
    let compiled = compile(
        &json!([{
            "@id": "?",
            "ex:hair_color": "?",
            "ex:friends": [{"@id": "?"}],
            "ex:steps": {"@list": ["?"]}
        }]),
        &Parser::default(),
    )?;
    let (_, solutions) = source.evaluate_sync(&compiled.algebra)?;
    assert!(solutions.len() >= 5);

    let fold = |solutions: &[&QuerySolution]| -> Result<JsonValue, ResultError> {
        solutions
            .iter()
            .copied()
            .try_fold(compiled.intermediate_result.clone(), |result, solution| {
                result.add_solution(solution)
            })?
            .result()
            .map(canonical)
    };
    let solutions = solutions.iter().collect::<Vec<_>>();
    let expected = fold(solutions.as_slice())?;
    assert_eq!(
        expected,
        canonical(json!([
            {"@id": "ex:1", "ex:hair_color": "blond", "ex:friends": [], "ex:steps": {"@list": ["a", "b", "c"]}},
            {"@id": "ex:2", "ex:hair_color": "red", "ex:friends": [{"@id": "ex:1"}, {"@id": "ex:3"}], "ex:steps": {"@list": []}}
        ]))
    );

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let mut shuffled = solutions.clone();
        shuffled.shuffle(&mut rng);
        assert_eq!(fold(shuffled.as_slice())?, expected);
    }
    let head = solutions.len().min(5);
    for permutation in solutions.iter().take(head).copied().permutations(head) {
        let mut reordered = permutation;
        reordered.extend(solutions.iter().skip(head).copied());
        assert_eq!(fold(reordered.as_slice())?, expected);
    }
    Ok(())
}

#[tokio::test]
async fn response_snapshot() -> Result<(), Box<dyn Error>> {
    let response = query(
        &source()?,
        &json!({
            "@context": {"@vocab": "ex:"},
            "@id": "?",
            "hair_color": "blond",
            "eye_color": "?",
            "_:bogus": "x"
        }),
    )
    .await?;

    insta::assert_snapshot!(serde_json::to_string_pretty(&response)?, @r#"
    {
      "data": {
        "@context": {
          "@vocab": "ex:"
        },
        "@id": "ex:1",
        "hair_color": "blond",
        "eye_color": "blue",
        "_:bogus": "x"
      },
      "warnings": [
        {
          "message": "The key '_:bogus' is not defined in the context",
          "path": [
            "_:bogus"
          ]
        }
      ]
    }
    "#);
    Ok(())
}
