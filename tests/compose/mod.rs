mod tests_repositories;
mod tests_resolution;
mod tests_scenarios;
