mod common;

use std::time::Duration;

use common::{html_page, TestServer};
use posting_engine::{
    run_batch, Credentials, FailureKind, HarvestSettings, HttpJobSite, LinkHarvester,
    ListingSession, LoginForm, NullSink, PaginatedHarvester, SessionError, SiteProfile,
    StopReason, TermPlan,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string_contains, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(html_page(body), "text/html; charset=utf-8")
}

fn result_list(hrefs: &[Option<&str>], next: Option<&str>) -> String {
    let items: String = hrefs
        .iter()
        .map(|href| match href {
            Some(href) => format!(r#"<li><a class="base-card__full-link" href="{href}">Job</a></li>"#),
            None => "<li><span>Promoted</span></li>".to_string(),
        })
        .collect();
    let next = next
        .map(|href| format!(r#"<a aria-label="Next" href="{href}">Next</a>"#))
        .unwrap_or_default();
    format!(r#"<ul class="jobs-search__results-list">{items}</ul>{next}"#)
}

fn posting(title: &str, blob: &[&str], salary: Option<&str>) -> String {
    let spans: String = blob.iter().map(|s| format!("<span>{s}</span>")).collect();
    let salary = salary
        .map(|s| format!(r#"<div class="salary">{s}</div>"#))
        .unwrap_or_default();
    format!(
        r#"<h1 class="top-card-layout__title">{title}</h1>
           <div class="topcard__flavor-row">{spans}</div>{salary}
           <div class="show-more-less-html__markup">About the role</div>"#
    )
}

fn profile_for(server: &TestServer) -> SiteProfile {
    SiteProfile {
        search_url: server.url("/jobs/search?keywords={keywords}"),
        ..SiteProfile::default()
    }
}

fn mount_search(server: &TestServer) {
    server.mount(
        Mock::given(method("GET"))
            .and(path("/jobs/search"))
            .and(query_param("keywords", "Data Scientist"))
            .and(query_param_is_missing("start"))
            .respond_with(html(&result_list(
                &[Some("/jobs/view/1?trk=search"), None, Some("/jobs/view/2")],
                Some("/jobs/search?keywords=Data+Scientist&start=25"),
            ))),
    );
    server.mount(
        Mock::given(method("GET"))
            .and(path("/jobs/search"))
            .and(query_param("start", "25"))
            .respond_with(html(&result_list(
                &[Some("/jobs/view/2"), Some("/jobs/view/3"), Some("#")],
                None,
            ))),
    );
}

fn site(profile: SiteProfile) -> PaginatedHarvester<HttpJobSite> {
    let site = HttpJobSite::new(profile, Default::default()).unwrap();
    PaginatedHarvester::new(
        site,
        HarvestSettings {
            settle_delay: Duration::ZERO,
        },
    )
}

#[test]
fn harvest_follows_next_links_until_they_run_out() {
    let server = TestServer::start();
    mount_search(&server);
    let mut harvester = site(profile_for(&server));

    let outcome = harvester.harvest("Data Scientist", 5, &NullSink);

    assert_eq!(
        outcome.links,
        vec![
            server.url("/jobs/view/1?trk=search"),
            server.url("/jobs/view/2"),
            server.url("/jobs/view/3"),
        ]
    );
    assert_eq!(outcome.pages_read, 2);
    assert_eq!(outcome.skipped_items, 2);
    assert_eq!(outcome.stop, StopReason::NoMorePages);
}

#[test]
fn unreachable_search_yields_no_links() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/jobs/search"))
            .respond_with(ResponseTemplate::new(503)),
    );
    let mut harvester = site(profile_for(&server));

    let outcome = harvester.harvest("Data Scientist", 3, &NullSink);

    assert!(outcome.links.is_empty());
    assert!(matches!(outcome.stop, StopReason::SearchUnavailable(_)));
}

#[test]
fn batch_fetches_and_normalizes_harvested_postings() {
    let server = TestServer::start();
    mount_search(&server);
    server.mount(
        Mock::given(method("GET"))
            .and(path("/jobs/view/1"))
            .respond_with(html(&posting(
                "Data Scientist",
                &["Acme Corp", "Toronto, ON", "2 weeks ago", "57 applicants"],
                Some("$90K/yr"),
            ))),
    );
    server.mount(
        Mock::given(method("GET"))
            .and(path("/jobs/view/2"))
            .respond_with(html(&posting(
                "ML Engineer",
                &["Beta", "Vancouver, BC", "1 day ago", "Over 100 applicants"],
                Some("$60/hr - $70/hr"),
            ))),
    );
    server.mount(
        Mock::given(method("GET"))
            .and(path("/jobs/view/3"))
            .respond_with(ResponseTemplate::new(404)),
    );
    let mut harvester = site(profile_for(&server));
    let plans = vec![TermPlan {
        search_term: "Data Scientist".to_string(),
        max_pages: 3,
    }];

    let mut finished = Vec::new();
    let report = run_batch(&mut harvester, &plans, &NullSink, |term| {
        finished.push(term.harvest.search_term.clone())
    });

    assert_eq!(finished, vec!["Data Scientist"]);
    let term = &report.terms[0];
    assert_eq!(term.raw_postings.len(), 2);
    assert_eq!(term.fetch_failures.len(), 1);
    assert_eq!(term.fetch_failures[0].0, server.url("/jobs/view/3"));
    assert_eq!(term.fetch_failures[0].1.kind, FailureKind::HttpStatus(404));

    let postings = &report.dataset()["Data Scientist"];
    assert_eq!(postings.len(), 2);
    assert_eq!(postings[0].employer, "Acme Corp");
    assert_eq!(postings[0].annual_salary_amount(), Some(90_000.0));
    assert_eq!(postings[1].country.as_deref(), Some("Canada"));
    assert_eq!(postings[1].num_applicants, Some(100.0));
    assert_eq!(postings[1].annual_salary_amount(), Some(130_000.0));
}

#[test]
fn login_posts_the_credential_form() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_string_contains("session_key=me"))
            .and(body_string_contains("session_password=secret"))
            .respond_with(html("welcome"))
            .expect(1),
    );
    let profile = SiteProfile {
        login: Some(LoginForm {
            url: server.url("/login"),
            ..LoginForm::default()
        }),
        ..profile_for(&server)
    };
    let mut harvester = site(profile);
    let credentials = Credentials {
        username: "me".to_string(),
        password: "secret".to_string(),
    };

    harvester.session_mut().authenticate(&credentials).unwrap();
}

#[test]
fn rejected_login_is_reported() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(401)),
    );
    let profile = SiteProfile {
        login: Some(LoginForm {
            url: server.url("/login"),
            ..LoginForm::default()
        }),
        ..profile_for(&server)
    };
    let mut harvester = site(profile);
    let credentials = Credentials {
        username: "me".to_string(),
        password: "wrong".to_string(),
    };

    let err = harvester.session_mut().authenticate(&credentials).unwrap_err();
    assert!(matches!(err, SessionError::LoginRejected(_)));
}
