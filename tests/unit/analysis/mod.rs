mod repository_mock;
